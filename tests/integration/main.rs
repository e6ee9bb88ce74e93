//! HTTP-level integration tests.
//!
//! Tests that need PostgreSQL read `COMPLYHUB_TEST_DATABASE_URL` and are
//! skipped when it is unset.

mod helpers;

mod auth_test;
mod document_test;
mod folder_test;
mod organization_test;
mod program_test;
mod router_test;
mod template_test;
