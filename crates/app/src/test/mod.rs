//! Shared test fixtures and databases.
