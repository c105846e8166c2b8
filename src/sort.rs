use crate::point::Point;
use std::cmp::Ordering;

/// Partitions this small or smaller are insertion sorted.
const INSERTION_THRESHOLD: usize = 20;

pub fn sort_by_distance(ids: &mut [usize], coords: &[Point], center: Point) {
    if ids.len() > 1 {
        quicksort(ids, coords, 0, ids.len() - 1, center);
    }
}

fn compare(coords: &[Point], i: usize, j: usize, center: Point) -> Ordering {
    let a = coords[i];
    let b = coords[j];
    let d1 = a.dist2(center);
    let d2 = b.dist2(center);
    d1.partial_cmp(&d2)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        .then_with(|| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

fn quicksort(ids: &mut [usize], coords: &[Point], left: usize, right: usize, center: Point) {
    if right <= left + INSERTION_THRESHOLD {
        for i in (left + 1)..=right {
            let temp = ids[i];
            let mut j = i;
            while j > left && compare(coords, ids[j - 1], temp, center) == Ordering::Greater {
                ids[j] = ids[j - 1];
                j -= 1;
            }
            ids[j] = temp;
        }
        return;
    }

    // Median of three: after this ids[left] <= ids[left + 1] <= ids[right]
    // and those two ends act as sentinels for the scans below.
    let median = (left + right) >> 1;
    let mut i = left + 1;
    let mut j = right;
    ids.swap(median, i);
    if compare(coords, ids[left], ids[right], center) == Ordering::Greater {
        ids.swap(left, right);
    }
    if compare(coords, ids[i], ids[right], center) == Ordering::Greater {
        ids.swap(i, right);
    }
    if compare(coords, ids[left], ids[i], center) == Ordering::Greater {
        ids.swap(left, i);
    }

    let temp = ids[i];
    loop {
        i += 1;
        while compare(coords, ids[i], temp, center) == Ordering::Less {
            i += 1;
        }
        j -= 1;
        while compare(coords, ids[j], temp, center) == Ordering::Greater {
            j -= 1;
        }
        if j < i {
            break;
        }
        ids.swap(i, j);
    }
    ids[left + 1] = ids[j];
    ids[j] = temp;

    // Smaller side first.
    if right - i + 1 >= j - left {
        quicksort(ids, coords, left, j - 1, center);
        quicksort(ids, coords, i, right, center);
    } else {
        quicksort(ids, coords, i, right, center);
        quicksort(ids, coords, left, j - 1, center);
    }
}
