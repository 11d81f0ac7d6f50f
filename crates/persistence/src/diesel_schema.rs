// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

// Only the columns this tool reads or writes are declared. The `role` table
// is seeded by the migrations and never touched afterwards.

diesel::table! {
    contest (cid) {
        cid -> Integer,
        externalid -> Nullable<Text>,
        name -> Text,
        shortname -> Text,
        activatetime -> Double,
        starttime -> Double,
        freezetime -> Nullable<Double>,
        endtime -> Double,
        unfreezetime -> Nullable<Double>,
        deactivatetime -> Nullable<Double>,
        activatetime_string -> Text,
        starttime_string -> Text,
        freezetime_string -> Nullable<Text>,
        endtime_string -> Text,
        unfreezetime_string -> Nullable<Text>,
        deactivatetime_string -> Nullable<Text>,
        enabled -> Integer,
        public -> Integer,
    }
}

diesel::table! {
    team (teamid) {
        teamid -> Integer,
        externalid -> Nullable<Text>,
        name -> Text,
        categoryid -> Integer,
        enabled -> Integer,
        members -> Nullable<Text>,
    }
}

diesel::table! {
    user (userid) {
        userid -> Integer,
        username -> Text,
        name -> Text,
        email -> Nullable<Text>,
        password -> Nullable<Text>,
        enabled -> Integer,
        teamid -> Nullable<Integer>,
    }
}

diesel::table! {
    userrole (userid, roleid) {
        userid -> Integer,
        roleid -> Integer,
    }
}

diesel::table! {
    contestteam (cid, teamid) {
        cid -> Integer,
        teamid -> Integer,
    }
}

diesel::table! {
    rankcache (cid, teamid) {
        cid -> Integer,
        teamid -> Integer,
        points_restricted -> Integer,
        totaltime_restricted -> Integer,
    }
}

diesel::joinable!(user -> team (teamid));
diesel::joinable!(userrole -> user (userid));
diesel::joinable!(contestteam -> contest (cid));
diesel::joinable!(contestteam -> team (teamid));
diesel::joinable!(rankcache -> contest (cid));
diesel::joinable!(rankcache -> team (teamid));

diesel::allow_tables_to_appear_in_same_query!(contest, contestteam, rankcache, team, user, userrole);
