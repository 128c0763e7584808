//! Floyd–Rivest selection: move the k smallest elements to the front without sorting.
//!
//! Recursion only happens on ranges above [`SAMPLE_THRESHOLD`] and each level shrinks the
//! window to roughly n^(2/3), so depth stays O(log log n).

use std::cmp::Ordering;

/// Ranges larger than this are narrowed by sampling before partitioning.
pub const SAMPLE_THRESHOLD: isize = 600;

/// Rearrange `items` so that `items[..k]` holds the k smallest elements under `compare`
/// and no element in `items[k..]` compares less than any of them. Order inside either side
/// is unspecified. `k == 0` or `k >= items.len()` leaves the slice untouched.
pub fn partition<T, F>(items: &mut [T], k: usize, mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if k == 0 || k >= items.len() {
        return;
    }
    // placing the k-th order statistic at index k leaves the k smallest in front of it
    select(items, k as isize, 0, items.len() as isize - 1, &mut compare);
}

/// Partition then keep the front `k` elements, ordered by `compare`.
pub fn select_top_k<T, F>(mut items: Vec<T>, k: usize, mut compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    partition(&mut items, k, &mut compare);
    items.truncate(k);
    items.sort_by(|a, b| compare(a, b));
    items
}

fn select<T, F>(items: &mut [T], k: isize, mut left: isize, mut right: isize, compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    while right > left {
        if right - left > SAMPLE_THRESHOLD {
            let n = (right - left + 1) as f64;
            let i = (k - left + 1) as f64;
            let z = n.ln();
            let s = 0.5 * (2.0 * z / 3.0).exp();
            let sign = if i - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * (z * s * (n - s) / n).sqrt() * sign;
            let new_left = left.max((k as f64 - i * s / n + sd).floor() as isize);
            let new_right = right.min((k as f64 + (n - i) * s / n + sd).floor() as isize);
            select(items, k, new_left, new_right, compare);
        }

        let pivot = items[k as usize].clone();
        let mut i = left;
        let mut j = right;

        items.swap(left as usize, k as usize);
        if compare(&items[right as usize], &pivot) == Ordering::Greater {
            items.swap(left as usize, right as usize);
        }

        while i < j {
            items.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
            while compare(&items[i as usize], &pivot) == Ordering::Less {
                i += 1;
            }
            while compare(&items[j as usize], &pivot) == Ordering::Greater {
                j -= 1;
            }
        }

        if compare(&items[left as usize], &pivot) == Ordering::Equal {
            items.swap(left as usize, j as usize);
        } else {
            j += 1;
            items.swap(j as usize, right as usize);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}
