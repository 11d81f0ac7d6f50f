// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-generic access to the monomorphic queries and mutations.
//!
//! `backend_fn!` produces a `_sqlite` and a `_mysql` copy of every leaf
//! function. The multi-step operations (register, deregister, contest
//! teardown, ...) are written once against `RegistryStore`, and
//! `registry_store_impl!` wires each method to the matching copy for one
//! connection type.

use crate::backend::PersistenceBackend;
use crate::data_models::{
    ContestRow, MembershipRow, NewContestRow, RankRow, RoleAssignmentRow, TeamRow, UserRow,
};
use crate::error::PersistenceError;
use crate::{mutations, queries};
use diesel::{MysqlConnection, SqliteConnection};

/// Row-level operations over one backend connection.
pub trait RegistryStore: PersistenceBackend {
    fn find_user_by_email(&mut self, email: &str) -> Result<Option<UserRow>, PersistenceError>;
    fn find_user_by_id(&mut self, user_id: i32) -> Result<Option<UserRow>, PersistenceError>;
    fn find_team(&mut self, team_id: i32) -> Result<Option<TeamRow>, PersistenceError>;
    fn find_role_assignment(
        &mut self,
        user_id: i32,
    ) -> Result<Option<RoleAssignmentRow>, PersistenceError>;
    fn find_membership(&mut self, team_id: i32) -> Result<Option<MembershipRow>, PersistenceError>;
    fn find_contest_by_short_name(
        &mut self,
        short_name: &str,
    ) -> Result<Option<ContestRow>, PersistenceError>;
    fn list_contest_team_ids(&mut self, contest_id: i32) -> Result<Vec<i32>, PersistenceError>;
    fn list_rank_rows(&mut self, contest_id: i32) -> Result<Vec<RankRow>, PersistenceError>;

    fn insert_team(&mut self, team_id: i32, username: &str) -> Result<(), PersistenceError>;
    fn insert_user(
        &mut self,
        user_id: i32,
        username: &str,
        display_name: &str,
        email: &str,
        secret_hash: &str,
    ) -> Result<(), PersistenceError>;
    fn insert_role_assignment(&mut self, user_id: i32, role_id: i32)
    -> Result<(), PersistenceError>;
    fn insert_membership(&mut self, contest_id: i32, team_id: i32) -> Result<(), PersistenceError>;
    fn insert_contest(&mut self, row: &NewContestRow<'_>) -> Result<(), PersistenceError>;
    fn update_user_password(&mut self, user_id: i32, secret_hash: &str)
    -> Result<(), PersistenceError>;

    fn delete_memberships_for_team(&mut self, team_id: i32) -> Result<usize, PersistenceError>;
    fn delete_role_assignments_for_user(&mut self, user_id: i32)
    -> Result<usize, PersistenceError>;
    fn delete_user(&mut self, user_id: i32) -> Result<usize, PersistenceError>;
    fn delete_team(&mut self, team_id: i32) -> Result<usize, PersistenceError>;
    fn delete_contest(&mut self, contest_id: i32) -> Result<usize, PersistenceError>;
}

/// Implements `RegistryStore` for a connection type by forwarding each method
/// to the `backend_fn!` copy carrying `$suffix`.
macro_rules! registry_store_impl {
    ($conn:ty, $suffix:ident) => {
        pastey::paste! {
            impl RegistryStore for $conn {
                fn find_user_by_email(&mut self, email: &str) -> Result<Option<UserRow>, PersistenceError> {
                    queries::registrations::[<find_user_by_email_ $suffix>](self, email)
                }

                fn find_user_by_id(&mut self, user_id: i32) -> Result<Option<UserRow>, PersistenceError> {
                    queries::registrations::[<find_user_by_id_ $suffix>](self, user_id)
                }

                fn find_team(&mut self, team_id: i32) -> Result<Option<TeamRow>, PersistenceError> {
                    queries::registrations::[<find_team_ $suffix>](self, team_id)
                }

                fn find_role_assignment(
                    &mut self,
                    user_id: i32,
                ) -> Result<Option<RoleAssignmentRow>, PersistenceError> {
                    queries::registrations::[<find_role_assignment_ $suffix>](self, user_id)
                }

                fn find_membership(&mut self, team_id: i32) -> Result<Option<MembershipRow>, PersistenceError> {
                    queries::registrations::[<find_membership_ $suffix>](self, team_id)
                }

                fn find_contest_by_short_name(
                    &mut self,
                    short_name: &str,
                ) -> Result<Option<ContestRow>, PersistenceError> {
                    queries::contests::[<find_contest_by_short_name_ $suffix>](self, short_name)
                }

                fn list_contest_team_ids(&mut self, contest_id: i32) -> Result<Vec<i32>, PersistenceError> {
                    queries::contests::[<list_contest_team_ids_ $suffix>](self, contest_id)
                }

                fn list_rank_rows(&mut self, contest_id: i32) -> Result<Vec<RankRow>, PersistenceError> {
                    queries::contests::[<list_rank_rows_ $suffix>](self, contest_id)
                }

                fn insert_team(&mut self, team_id: i32, username: &str) -> Result<(), PersistenceError> {
                    mutations::registrations::[<insert_team_ $suffix>](self, team_id, username)
                }

                fn insert_user(
                    &mut self,
                    user_id: i32,
                    username: &str,
                    display_name: &str,
                    email: &str,
                    secret_hash: &str,
                ) -> Result<(), PersistenceError> {
                    mutations::registrations::[<insert_user_ $suffix>](
                        self,
                        user_id,
                        username,
                        display_name,
                        email,
                        secret_hash,
                    )
                }

                fn insert_role_assignment(
                    &mut self,
                    user_id: i32,
                    role_id: i32,
                ) -> Result<(), PersistenceError> {
                    mutations::registrations::[<insert_role_assignment_ $suffix>](self, user_id, role_id)
                }

                fn insert_membership(&mut self, contest_id: i32, team_id: i32) -> Result<(), PersistenceError> {
                    mutations::registrations::[<insert_membership_ $suffix>](self, contest_id, team_id)
                }

                fn insert_contest(&mut self, row: &NewContestRow<'_>) -> Result<(), PersistenceError> {
                    mutations::contests::[<insert_contest_ $suffix>](self, row)
                }

                fn update_user_password(
                    &mut self,
                    user_id: i32,
                    secret_hash: &str,
                ) -> Result<(), PersistenceError> {
                    mutations::registrations::[<update_user_password_ $suffix>](self, user_id, secret_hash)
                }

                fn delete_memberships_for_team(&mut self, team_id: i32) -> Result<usize, PersistenceError> {
                    mutations::registrations::[<delete_memberships_for_team_ $suffix>](self, team_id)
                }

                fn delete_role_assignments_for_user(
                    &mut self,
                    user_id: i32,
                ) -> Result<usize, PersistenceError> {
                    mutations::registrations::[<delete_role_assignments_for_user_ $suffix>](self, user_id)
                }

                fn delete_user(&mut self, user_id: i32) -> Result<usize, PersistenceError> {
                    mutations::registrations::[<delete_user_ $suffix>](self, user_id)
                }

                fn delete_team(&mut self, team_id: i32) -> Result<usize, PersistenceError> {
                    mutations::registrations::[<delete_team_ $suffix>](self, team_id)
                }

                fn delete_contest(&mut self, contest_id: i32) -> Result<usize, PersistenceError> {
                    mutations::contests::[<delete_contest_ $suffix>](self, contest_id)
                }
            }
        }
    };
}

registry_store_impl!(SqliteConnection, sqlite);
registry_store_impl!(MysqlConnection, mysql);
