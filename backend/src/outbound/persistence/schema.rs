//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One-to-one subscription profile, created with the user.
    user_profiles (user_id) {
        user_id -> Uuid,
        /// `free` or `premium`.
        account_type -> Varchar,
    }
}

diesel::table! {
    projects (id) {
        id -> Int8,
        /// Immutable external identifier used by ingestion clients.
        uid -> Uuid,
        name -> Varchar,
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    api_keys (id) {
        id -> Int8,
        /// Secret presented in the `API-Key` header. Unique.
        secret -> Uuid,
        project_id -> Int8,
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    error_groups (id) {
        id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    error_logs (id) {
        id -> Int8,
        error_message -> Text,
        environment -> Nullable<Text>,
        project_id -> Int8,
        error_group_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Session token blacklist keyed by token id.
    revoked_tokens (jti) {
        jti -> Uuid,
        expires_at -> Timestamptz,
        revoked_at -> Timestamptz,
    }
}

diesel::joinable!(user_profiles -> users (user_id));
diesel::joinable!(projects -> users (owner_id));
diesel::joinable!(api_keys -> projects (project_id));
diesel::joinable!(error_logs -> projects (project_id));
diesel::joinable!(error_logs -> error_groups (error_group_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_profiles,
    projects,
    api_keys,
    error_groups,
    error_logs,
    revoked_tokens,
);
