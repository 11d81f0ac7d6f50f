// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::{Contest, ContestSchedule, NewContest, UserAccount};
use diesel::prelude::*;

use crate::diesel_schema::{contest, contestteam, rankcache, team, user, userrole};

/// Diesel Queryable struct for user rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user)]
pub struct UserRow {
    pub userid: i32,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub enabled: i32,
    pub teamid: Option<i32>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.userid,
            username: row.username,
            display_name: row.name,
            email: row.email,
            team_id: row.teamid,
            enabled: row.enabled != 0,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = team)]
pub struct TeamRow {
    pub teamid: i32,
    pub name: String,
}

/// Diesel Queryable struct for the contest columns this tool reads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contest)]
pub struct ContestRow {
    pub cid: i32,
    pub shortname: String,
    pub name: String,
    pub starttime: f64,
    pub endtime: f64,
    pub endtime_string: String,
    pub enabled: i32,
    pub public: i32,
}

impl From<ContestRow> for Contest {
    fn from(row: ContestRow) -> Self {
        Self {
            contest_id: row.cid,
            short_name: row.shortname,
            name: row.name,
            start_time: row.starttime,
            end_time: row.endtime,
            end_time_string: row.endtime_string,
            enabled: row.enabled != 0,
            public: row.public != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = userrole)]
pub struct RoleAssignmentRow {
    pub userid: i32,
    pub roleid: i32,
}

#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = contestteam)]
pub struct MembershipRow {
    pub cid: i32,
    pub teamid: i32,
}

/// Diesel Queryable struct for cached scoreboard rows.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = rankcache)]
pub struct RankRow {
    pub cid: i32,
    pub teamid: i32,
    pub points_restricted: i32,
    pub totaltime_restricted: i32,
}

/// Insertable contest row; every schedule column is written.
#[derive(Debug, Insertable)]
#[diesel(table_name = contest)]
pub struct NewContestRow<'a> {
    pub cid: i32,
    pub externalid: &'a str,
    pub name: &'a str,
    pub shortname: &'a str,
    pub activatetime: f64,
    pub starttime: f64,
    pub freezetime: f64,
    pub endtime: f64,
    pub unfreezetime: f64,
    pub deactivatetime: f64,
    pub activatetime_string: &'a str,
    pub starttime_string: &'a str,
    pub freezetime_string: &'a str,
    pub endtime_string: &'a str,
    pub unfreezetime_string: &'a str,
    pub deactivatetime_string: &'a str,
    pub enabled: i32,
    pub public: i32,
}

impl<'a> NewContestRow<'a> {
    /// Builds the row for `contest` under id `cid`.
    ///
    /// The external id is the short name. New contests are enabled and not
    /// public.
    #[must_use]
    pub fn new(cid: i32, contest: &'a NewContest) -> Self {
        let schedule: &ContestSchedule = contest.schedule();
        Self {
            cid,
            externalid: contest.short_name(),
            name: contest.name(),
            shortname: contest.short_name(),
            activatetime: schedule.activate.epoch_f64(),
            starttime: schedule.start.epoch_f64(),
            freezetime: schedule.freeze.epoch_f64(),
            endtime: schedule.end.epoch_f64(),
            unfreezetime: schedule.unfreeze.epoch_f64(),
            deactivatetime: schedule.deactivate.epoch_f64(),
            activatetime_string: schedule.activate.formatted(),
            starttime_string: schedule.start.formatted(),
            freezetime_string: schedule.freeze.formatted(),
            endtime_string: schedule.end.formatted(),
            unfreezetime_string: schedule.unfreeze.formatted(),
            deactivatetime_string: schedule.deactivate.formatted(),
            enabled: 1,
            public: 0,
        }
    }

    /// The row as it reads back from the store.
    #[must_use]
    pub fn to_contest(&self) -> Contest {
        Contest {
            contest_id: self.cid,
            short_name: self.shortname.to_string(),
            name: self.name.to_string(),
            start_time: self.starttime,
            end_time: self.endtime,
            end_time_string: self.endtime_string.to_string(),
            enabled: self.enabled != 0,
            public: self.public != 0,
        }
    }
}
