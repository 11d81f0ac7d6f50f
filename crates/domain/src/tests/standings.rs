// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Standing, rank_standings};

fn standing(user_id: i32, points: i32, total_time: i64) -> Standing {
    Standing {
        email: format!("u{user_id}@x.com"),
        username: format!("user{user_id}"),
        user_id,
        contest_id: 5,
        points,
        total_time,
    }
}

fn order(standings: &[Standing]) -> Vec<i32> {
    standings.iter().map(|s| s.user_id).collect()
}

#[test]
fn test_rank_by_points_descending() {
    let mut standings = vec![standing(1, 2, 10), standing(2, 5, 900)];
    rank_standings(&mut standings);
    assert_eq!(order(&standings), vec![2, 1]);
}

#[test]
fn test_ties_broken_by_total_time_ascending() {
    let mut standings = vec![standing(1, 3, 120), standing(2, 3, 45), standing(3, 4, 500)];
    rank_standings(&mut standings);
    assert_eq!(order(&standings), vec![3, 2, 1]);
}

#[test]
fn test_full_ties_keep_input_order() {
    let mut standings = vec![standing(4, 1, 60), standing(2, 1, 60)];
    rank_standings(&mut standings);
    assert_eq!(order(&standings), vec![4, 2]);
}
