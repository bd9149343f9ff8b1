//! Two ways of driving an `IntervalSet`: a membership lookup over `low-high`
//! ranges, and the consume-one-value loop built from `peek`, `split_at` and
//! overlap search.

use rb_interval_set::{Interval, IntervalSet};

const RANGES: &str = "3-5
10-14
16-20
12-18";

/// Parse one `low-high` line.
fn parse_range(line: &str) -> Option<Interval> {
    let (low, high) = line.trim().split_once('-')?;
    Interval::try_new(low.parse().ok()?, high.parse().ok()?).ok()
}

fn main() {
    let set: IntervalSet = RANGES.lines().filter_map(parse_range).collect();

    let fresh: Vec<i64> = [1, 5, 8, 11, 17, 32]
        .into_iter()
        .filter(|id| set.interval_search(*id).is_some())
        .collect();
    assert_eq!(fresh, vec![5, 11, 17]);
    assert_eq!(set.sum_lengths(), 14);

    // Consume the covered values one at a time: pick some remaining interval,
    // then walk forward from its low end while the point stays covered.
    let mut set = set;
    let mut iterations = 0;
    while let Some(interval) = set.peek().copied() {
        let mut point = interval.low();
        while let Some(id) = set.interval_search(point) {
            let found = set.delete(id);
            let Ok((left, right)) = found.split_at(point) else {
                unreachable!("interval_search returned {found} for {point}");
            };
            for piece in left.into_iter().chain(right) {
                set.insert(piece);
            }
            iterations += 1;
            point += 1;
        }
    }
    assert_eq!(iterations, 14);
    println!("consumed {iterations} values");
}
