use std::cmp::Ordering;
use rand::Rng;
use crate::tree::Comparator;

/// Sorts `items` in place with a recursive quicksort. The middle element of each partition
/// is used as the pivot.
///
/// Sorted and reverse-sorted input partition evenly. Adversarial input can still force
/// `O(n²)` comparisons; see [`quicksort_with_rng`] for a randomized pivot.
pub fn quicksort<T, C: Comparator<T>>(items: &mut [T], cmp: &C) {
    sort_partition(items, cmp, &mut |len| len / 2);
}

/// Like [`quicksort`] but draws each pivot uniformly at random from its partition.
pub fn quicksort_with_rng<T, C: Comparator<T>, R: Rng>(items: &mut [T], cmp: &C, rng: &mut R) {
    sort_partition(items, cmp, &mut |len| rng.gen_range(0..len));
}

fn sort_partition<T, C: Comparator<T>>(mut items: &mut [T], cmp: &C,
    choose_pivot: &mut dyn FnMut(usize) -> usize)
{
    // Recurse into the smaller side and loop on the larger one, which bounds the stack depth
    // by log2(n).
    while items.len() > 1 {
        let split = partition(items, cmp, choose_pivot(items.len()));
        let (lower, upper) = std::mem::take(&mut items).split_at_mut(split);
        let upper = &mut upper[1..];
        if lower.len() < upper.len() {
            sort_partition(lower, cmp, choose_pivot);
            items = upper;
        } else {
            sort_partition(upper, cmp, choose_pivot);
            items = lower;
        }
    }
}

/// Moves the pivot to the front, swaps every element less than it forward, then restores the
/// pivot between the two groups. Returns the pivot's final position.
fn partition<T, C: Comparator<T>>(items: &mut [T], cmp: &C, pivot: usize) -> usize {
    items.swap(0, pivot);
    let mut last = 0;
    for i in 1..items.len() {
        if cmp.compare(&items[i], &items[0]) == Ordering::Less {
            last += 1;
            items.swap(last, i);
        }
    }
    items.swap(0, last);
    return last;
}
