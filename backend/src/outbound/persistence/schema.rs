//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation. The `enrollments` table carries a
//! unique index on `(user_id, course_id)` in the migrations, which backs the
//! duplicate-enrollment detection in the repository adapter.

diesel::table! {
    /// Course catalog, read-only from this service's perspective.
    courses (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        name -> Varchar,
        logo -> Varchar,
        category -> Varchar,
        duration -> Varchar,
        instructor -> Varchar,
        rating -> Float4,
        /// Price in major currency units; zero means free.
        price -> Int4,
        link -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Enrollment ledger. Unique on (user_id, course_id).
    enrollments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        /// Lifecycle status in its stable storage form.
        status -> Varchar,
        /// Progress percentage in [0, 100].
        progress -> Int4,
        started_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
        certificate_url -> Nullable<Varchar>,
        /// Embedded payment record for paid enrollments.
        payment -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Append-only payment receipts; written with their enrollment.
    payment_receipts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        enrollment_id -> Uuid,
        order_id -> Varchar,
        payment_id -> Varchar,
        /// Amount in major currency units.
        amount -> Int4,
        currency -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cached per-user counter projections, keyed by user.
    user_stats (user_id) {
        user_id -> Uuid,
        courses_enrolled -> Int4,
        courses_completed -> Int4,
        certificates_earned -> Int4,
        study_hours -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(courses, enrollments, payment_receipts, user_stats);
