use crate::error::Result;
use crate::tree::{Comparator, Tree};

/// Sorts `items` by inserting every element's position into a temporary [`Tree`] and reading
/// the positions back in order. Equal elements keep their relative order.
///
/// The first element becomes the root, so already sorted or reverse sorted input degrades
/// the tree into a list and costs `O(n²)` comparisons. Random input costs `O(n log n)`.
///
/// On allocation failure `items` is left untouched.
pub fn sort_in_place<T, C: Comparator<T>>(items: &mut [T], cmp: &C) -> Result<()> {
    if items.len() <= 1 { return Ok(()); }

    let order = {
        let elements: &[T] = items;
        let by_element = |a: &usize, b: &usize| cmp.compare(&elements[*a], &elements[*b]);
        let mut tree: Tree<usize> = Tree::with_capacity(elements.len())?;
        for idx in 0..elements.len() {
            tree.insert_value(idx, &by_element)?;
        }
        tree.into_in_order()
    };

    permute(items, &order);
    return Ok(());
}

/// Rearranges `items` so that `items[k]` afterwards holds what `items[order[k]]` held before.
/// `order` must be a permutation of `0..items.len()`.
fn permute<T>(items: &mut [T], order: &[usize]) {
    assert_eq!(items.len(), order.len());
    let mut placed = vec![false; items.len()];
    for start in 0..items.len() {
        let mut cur = start;
        while !placed[cur] {
            placed[cur] = true;
            let next = order[cur];
            if next == start { break; }
            items.swap(cur, next);
            cur = next;
        }
    }
}
