use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::RepoError;
use crate::models::{
    AdminDashboardStats, AttemptDetail, Certificate, Course, CourseEnrollment, CourseModule,
    CreateCourseRequest, CreateJobRequest, CreateLessonRequest, CreateModuleRequest,
    CreateQuizRequest, CreateResourceRequest, EnrollmentDetail, ExternalApiKey, Job, Lesson,
    LessonDetail, LessonResource, ModuleDetail, PrincipalRecord, Profile, Quiz, QuizAnswer,
    QuizAttempt, QuizQuestion, QuizView, RefreshToken, RegisterUserRequest, StudentDashboard,
    SubmittedAnswer, TenantAccount, TenantKind, UpdateCourseRequest, UpdateJobRequest,
    UpdateLessonRequest, UpdateModuleRequest, UpdateProfileRequest, UpdateQuizRequest, User,
};
use crate::scoring::score_submission;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers to interact with the data layer without knowing the specific
/// implementation (Postgres, Mock, etc.).
///
/// Every method returns `Result<_, RepoError>` so conflict/not-found
/// classification happens once, in the data layer, instead of per handler.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Principals & Accounts ---
    // Credential lookup for any of the four tenant families.
    async fn find_principal_by_username(
        &self,
        kind: TenantKind,
        username: &str,
    ) -> Result<Option<PrincipalRecord>, RepoError>;
    // Token re-verification: the principal must still exist (and be active).
    async fn find_principal_by_id(
        &self,
        kind: TenantKind,
        id: Uuid,
    ) -> Result<Option<PrincipalRecord>, RepoError>;
    async fn update_password_hash(
        &self,
        kind: TenantKind,
        id: Uuid,
        new_hash: &str,
    ) -> Result<bool, RepoError>;
    // Youth registration: user + profile created atomically.
    async fn register_user(
        &self,
        password_hash: &str,
        req: &RegisterUserRequest,
    ) -> Result<(User, Profile), RepoError>;
    // Self-view for company/institution/municipality accounts; `User` tenants
    // have no organisation row.
    async fn get_tenant_account(
        &self,
        kind: TenantKind,
        id: Uuid,
    ) -> Result<Option<TenantAccount>, RepoError>;
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<Option<Profile>, RepoError>;

    // --- Refresh Tokens ---
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    // Single-use semantics: atomically revokes and returns the row, or None if
    // the token is unknown, expired, or already revoked.
    async fn consume_refresh_token(&self, token: &str)
    -> Result<Option<RefreshToken>, RepoError>;

    // --- Courses / Modules / Lessons ---
    async fn list_courses(&self, published_only: bool) -> Result<Vec<Course>, RepoError>;
    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, RepoError>;
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, RepoError>;
    async fn update_course(
        &self,
        id: Uuid,
        req: UpdateCourseRequest,
    ) -> Result<Option<Course>, RepoError>;
    async fn delete_course(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn create_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, RepoError>;
    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>, RepoError>;
    async fn delete_module(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn create_lesson(
        &self,
        module_id: Uuid,
        req: CreateLessonRequest,
    ) -> Result<Lesson, RepoError>;
    async fn update_lesson(
        &self,
        id: Uuid,
        req: UpdateLessonRequest,
    ) -> Result<Option<Lesson>, RepoError>;
    async fn delete_lesson(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn add_lesson_resource(
        &self,
        lesson_id: Uuid,
        req: CreateResourceRequest,
    ) -> Result<LessonResource, RepoError>;
    async fn delete_lesson_resource(&self, id: Uuid) -> Result<bool, RepoError>;

    // --- Enrollments ---
    // Duplicate (student, course) pairs surface as Conflict with a fixed message.
    async fn create_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseEnrollment, RepoError>;
    async fn get_enrollment(&self, id: Uuid) -> Result<Option<CourseEnrollment>, RepoError>;
    async fn list_enrollments_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<CourseEnrollment>, RepoError>;
    // Admin access: all enrollments regardless of owner.
    async fn list_enrollments(&self) -> Result<Vec<CourseEnrollment>, RepoError>;
    async fn set_enrollment_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<CourseEnrollment>, RepoError>;
    // The enriched course → modules → lessons structure, resources and quizzes
    // attached per lesson.
    async fn get_enrollment_detail(&self, id: Uuid)
    -> Result<Option<EnrollmentDetail>, RepoError>;

    // --- Quizzes ---
    async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz, RepoError>;
    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, RepoError>;
    // Quiz plus its ordered, redacted question set.
    async fn get_quiz_view(&self, id: Uuid) -> Result<Option<QuizView>, RepoError>;
    async fn update_quiz(&self, id: Uuid, req: UpdateQuizRequest)
    -> Result<Option<Quiz>, RepoError>;
    async fn delete_quiz(&self, id: Uuid) -> Result<bool, RepoError>;
    // The whole attempt (attempt row + answer rows + final score update) runs in
    // one transaction; a mid-sequence failure leaves no partial attempt behind.
    async fn complete_quiz(
        &self,
        quiz_id: Uuid,
        enrollment_id: Uuid,
        answers: &[SubmittedAnswer],
    ) -> Result<QuizAttempt, RepoError>;
    async fn list_attempts_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<QuizAttempt>, RepoError>;
    // One attempt with its recorded answer rows, for post-completion review.
    async fn get_attempt_detail(&self, id: Uuid) -> Result<Option<AttemptDetail>, RepoError>;

    // --- Certificates ---
    async fn issue_certificate(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Certificate, RepoError>;
    async fn list_certificates_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<Certificate>, RepoError>;
    async fn get_certificate(&self, id: Uuid) -> Result<Option<Certificate>, RepoError>;

    // --- Jobs ---
    async fn list_open_jobs(&self) -> Result<Vec<Job>, RepoError>;
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, RepoError>;
    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> Result<Job, RepoError>;
    // Owner-Only: updates only if company_id matches the posting.
    async fn update_job(
        &self,
        id: Uuid,
        company_id: Uuid,
        req: UpdateJobRequest,
    ) -> Result<Option<Job>, RepoError>;
    async fn delete_job(&self, id: Uuid, company_id: Uuid) -> Result<bool, RepoError>;

    // --- External API Keys ---
    async fn create_api_key(&self, name: &str, key: &str) -> Result<ExternalApiKey, RepoError>;
    async fn list_api_keys(&self) -> Result<Vec<ExternalApiKey>, RepoError>;
    // Idempotent: always stamps revoked_at with the time of the call.
    async fn revoke_api_key(&self, id: Uuid) -> Result<Option<ExternalApiKey>, RepoError>;

    // --- Dashboards ---
    async fn get_admin_stats(&self) -> Result<AdminDashboardStats, RepoError>;
    async fn get_student_dashboard(
        &self,
        student_id: Uuid,
    ) -> Result<StudentDashboard, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries are runtime-bound (`query_as::<_, T>(..).bind(..)`) so the crate
/// builds without a live database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Table owning each tenant family's credential rows.
fn principal_table(kind: TenantKind) -> &'static str {
    match kind {
        TenantKind::Company => "companies",
        TenantKind::Institution => "institutions",
        TenantKind::Municipality => "municipalities",
        TenantKind::User => "users",
    }
}

/// Column list projecting any tenant table onto `PrincipalRecord`.
///
/// The `users` table stores a real role and has no activity flag (youth
/// accounts are never deactivated); the organisation tables are the inverse.
fn principal_projection(kind: TenantKind) -> String {
    match kind {
        TenantKind::User => {
            "SELECT id, username, password_hash, role, true AS is_active FROM users".to_string()
        }
        other => format!(
            "SELECT id, username, password_hash, '{}'::text AS role, is_active FROM {}",
            other.as_str(),
            principal_table(other)
        ),
    }
}

const COURSE_COLUMNS: &str = "id, title, description, is_published, created_at, updated_at";
const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, status, enrolled_at";
const QUIZ_COLUMNS: &str = "id, course_id, lesson_id, title, passing_score, created_at";
const ATTEMPT_COLUMNS: &str = "id, quiz_id, enrollment_id, score, passed, completed_at";
const JOB_COLUMNS: &str = "id, company_id, title, description, is_open, created_at, updated_at";
const API_KEY_COLUMNS: &str = "id, key, name, active, revoked_at, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- Principals & Accounts ---

    async fn find_principal_by_username(
        &self,
        kind: TenantKind,
        username: &str,
    ) -> Result<Option<PrincipalRecord>, RepoError> {
        let sql = format!("{} WHERE username = $1", principal_projection(kind));
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_principal_by_id(
        &self,
        kind: TenantKind,
        id: Uuid,
    ) -> Result<Option<PrincipalRecord>, RepoError> {
        let sql = format!("{} WHERE id = $1", principal_projection(kind));
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn update_password_hash(
        &self,
        kind: TenantKind,
        id: Uuid,
        new_hash: &str,
    ) -> Result<bool, RepoError> {
        let sql = format!(
            "UPDATE {} SET password_hash = $1 WHERE id = $2",
            principal_table(kind)
        );
        let result = sqlx::query(&sql)
            .bind(new_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// register_user
    ///
    /// The user row and its 1:1 profile are created in one transaction; a crash
    /// between the two inserts leaves nothing behind.
    async fn register_user(
        &self,
        password_hash: &str,
        req: &RegisterUserRequest,
    ) -> Result<(User, Profile), RepoError> {
        let mut tx = self.pool.begin().await?;

        let user_id = Uuid::new_v4();
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password_hash, role, created_at)
               VALUES ($1, $2, $3, 'student', NOW())
               RETURNING id, username, role, created_at"#,
        )
        .bind(user_id)
        .bind(&req.username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepoError::conflict_on_unique(e, "Username is already taken"))?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles (user_id, first_name, last_name, education_level, skills)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING user_id, first_name, last_name, education_level, skills"#,
        )
        .bind(user_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.education_level)
        .bind(&req.skills)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((user, profile))
    }

    async fn get_tenant_account(
        &self,
        kind: TenantKind,
        id: Uuid,
    ) -> Result<Option<TenantAccount>, RepoError> {
        if kind == TenantKind::User {
            return Ok(None);
        }
        let sql = format!(
            "SELECT id, username, name, is_active, created_at FROM {} WHERE id = $1",
            principal_table(kind)
        );
        let account = sqlx::query_as::<_, TenantAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"SELECT user_id, first_name, last_name, education_level, skills
               FROM profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// update_profile
    ///
    /// Uses `COALESCE` to handle `Option<T>` fields, only overwriting a column
    /// when the corresponding request field is `Some`.
    async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<Option<Profile>, RepoError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles
               SET first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   education_level = COALESCE($4, education_level),
                   skills = COALESCE($5, skills)
               WHERE user_id = $1
               RETURNING user_id, first_name, last_name, education_level, skills"#,
        )
        .bind(user_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.education_level)
        .bind(&req.skills)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    // --- Refresh Tokens ---

    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO refresh_tokens (token, user_id, expires_at, revoked)
               VALUES ($1, $2, $3, false)"#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// consume_refresh_token
    ///
    /// Single UPDATE enforcing the single-use flag: the row is revoked and
    /// returned in one statement, so a replay of the same token finds it
    /// already revoked and gets nothing.
    async fn consume_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshToken>, RepoError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"UPDATE refresh_tokens SET revoked = true
               WHERE token = $1 AND revoked = false AND expires_at > NOW()
               RETURNING token, user_id, expires_at, revoked"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // --- Courses / Modules / Lessons ---

    async fn list_courses(&self, published_only: bool) -> Result<Vec<Course>, RepoError> {
        let sql = if published_only {
            format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE is_published = true ORDER BY created_at DESC"
            )
        } else {
            format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC")
        };
        let courses = sqlx::query_as::<_, Course>(&sql).fetch_all(&self.pool).await?;
        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, RepoError> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, RepoError> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"INSERT INTO courses (id, title, description, is_published, created_at, updated_at)
               VALUES ($1, $2, $3, false, NOW(), NOW())
               RETURNING {COURSE_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&req.title)
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn update_course(
        &self,
        id: Uuid,
        req: UpdateCourseRequest,
    ) -> Result<Option<Course>, RepoError> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"UPDATE courses
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   is_published = COALESCE($4, is_published),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {COURSE_COLUMNS}"#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.is_published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, RepoError> {
        let module = sqlx::query_as::<_, CourseModule>(
            r#"INSERT INTO course_modules (id, course_id, title, order_index)
               VALUES ($1, $2, $3, $4)
               RETURNING id, course_id, title, order_index"#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(&req.title)
        .bind(req.order_index)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::not_found_on_fk)?;
        Ok(module)
    }

    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>, RepoError> {
        let module = sqlx::query_as::<_, CourseModule>(
            r#"UPDATE course_modules
               SET title = COALESCE($2, title),
                   order_index = COALESCE($3, order_index)
               WHERE id = $1
               RETURNING id, course_id, title, order_index"#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(req.order_index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(module)
    }

    async fn delete_module(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM course_modules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_lesson(
        &self,
        module_id: Uuid,
        req: CreateLessonRequest,
    ) -> Result<Lesson, RepoError> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"INSERT INTO lessons (id, module_id, title, content, order_index)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, module_id, title, content, order_index"#,
        )
        .bind(Uuid::new_v4())
        .bind(module_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.order_index)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::not_found_on_fk)?;
        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        id: Uuid,
        req: UpdateLessonRequest,
    ) -> Result<Option<Lesson>, RepoError> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"UPDATE lessons
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   order_index = COALESCE($4, order_index)
               WHERE id = $1
               RETURNING id, module_id, title, content, order_index"#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.order_index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lesson)
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_lesson_resource(
        &self,
        lesson_id: Uuid,
        req: CreateResourceRequest,
    ) -> Result<LessonResource, RepoError> {
        let resource = sqlx::query_as::<_, LessonResource>(
            r#"INSERT INTO lesson_resources (id, lesson_id, title, url)
               VALUES ($1, $2, $3, $4)
               RETURNING id, lesson_id, title, url"#,
        )
        .bind(Uuid::new_v4())
        .bind(lesson_id)
        .bind(&req.title)
        .bind(&req.url)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::not_found_on_fk)?;
        Ok(resource)
    }

    async fn delete_lesson_resource(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM lesson_resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Enrollments ---

    /// create_enrollment
    ///
    /// The unique constraint on (student_id, course_id) is the enforcement
    /// point; its violation is translated into the fixed client message here.
    async fn create_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseEnrollment, RepoError> {
        let enrollment = sqlx::query_as::<_, CourseEnrollment>(&format!(
            r#"INSERT INTO course_enrollments (id, student_id, course_id, status, enrolled_at)
               VALUES ($1, $2, $3, 'active', NOW())
               RETURNING {ENROLLMENT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return RepoError::NotFound;
                }
            }
            RepoError::conflict_on_unique(e, "Student is already enrolled in this course")
        })?;
        Ok(enrollment)
    }

    async fn get_enrollment(&self, id: Uuid) -> Result<Option<CourseEnrollment>, RepoError> {
        let enrollment = sqlx::query_as::<_, CourseEnrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM course_enrollments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    async fn list_enrollments_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<CourseEnrollment>, RepoError> {
        let enrollments = sqlx::query_as::<_, CourseEnrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM course_enrollments WHERE student_id = $1 ORDER BY enrolled_at DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(enrollments)
    }

    async fn list_enrollments(&self) -> Result<Vec<CourseEnrollment>, RepoError> {
        let enrollments = sqlx::query_as::<_, CourseEnrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM course_enrollments ORDER BY enrolled_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(enrollments)
    }

    async fn set_enrollment_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<CourseEnrollment>, RepoError> {
        let enrollment = sqlx::query_as::<_, CourseEnrollment>(&format!(
            r#"UPDATE course_enrollments SET status = $2 WHERE id = $1
               RETURNING {ENROLLMENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    /// get_enrollment_detail
    ///
    /// Assembles the nested course structure with supplementary queries per
    /// module and per lesson. Fan-out grows linearly with lesson count; this is
    /// pure data-shaping with no caching.
    async fn get_enrollment_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<EnrollmentDetail>, RepoError> {
        let Some(enrollment) = self.get_enrollment(id).await? else {
            return Ok(None);
        };
        let Some(course) = self.get_course(enrollment.course_id).await? else {
            return Ok(None);
        };

        let modules = sqlx::query_as::<_, CourseModule>(
            r#"SELECT id, course_id, title, order_index
               FROM course_modules WHERE course_id = $1 ORDER BY order_index ASC"#,
        )
        .bind(course.id)
        .fetch_all(&self.pool)
        .await?;

        let mut module_details = Vec::with_capacity(modules.len());
        for module in modules {
            let lessons = sqlx::query_as::<_, Lesson>(
                r#"SELECT id, module_id, title, content, order_index
                   FROM lessons WHERE module_id = $1 ORDER BY order_index ASC"#,
            )
            .bind(module.id)
            .fetch_all(&self.pool)
            .await?;

            let mut lesson_details = Vec::with_capacity(lessons.len());
            for lesson in lessons {
                let resources = sqlx::query_as::<_, LessonResource>(
                    "SELECT id, lesson_id, title, url FROM lesson_resources WHERE lesson_id = $1",
                )
                .bind(lesson.id)
                .fetch_all(&self.pool)
                .await?;

                let quizzes = sqlx::query_as::<_, Quiz>(&format!(
                    "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE lesson_id = $1"
                ))
                .bind(lesson.id)
                .fetch_all(&self.pool)
                .await?;

                lesson_details.push(LessonDetail {
                    lesson,
                    resources,
                    quizzes,
                });
            }

            module_details.push(ModuleDetail {
                module,
                lessons: lesson_details,
            });
        }

        Ok(Some(EnrollmentDetail {
            enrollment,
            course,
            modules: module_details,
        }))
    }

    // --- Quizzes ---

    /// create_quiz
    ///
    /// Quiz row plus its question rows in one transaction; question order
    /// follows the order of the request payload.
    async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz, RepoError> {
        let mut tx = self.pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            r#"INSERT INTO quizzes (id, course_id, lesson_id, title, passing_score, created_at)
               VALUES ($1, $2, $3, $4, $5, NOW())
               RETURNING {QUIZ_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(req.course_id)
        .bind(req.lesson_id)
        .bind(&req.title)
        .bind(req.passing_score)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::not_found_on_fk)?;

        for (index, question) in req.questions.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO quiz_questions (id, quiz_id, prompt, correct_answer, order_index)
                   VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(Uuid::new_v4())
            .bind(quiz.id)
            .bind(&question.prompt)
            .bind(&question.correct_answer)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quiz)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, RepoError> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn get_quiz_view(&self, id: Uuid) -> Result<Option<QuizView>, RepoError> {
        let Some(quiz) = self.get_quiz(id).await? else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT id, quiz_id, prompt, correct_answer, order_index
               FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index ASC"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(QuizView {
            id: quiz.id,
            course_id: quiz.course_id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            passing_score: quiz.passing_score,
            questions: questions.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update_quiz(
        &self,
        id: Uuid,
        req: UpdateQuizRequest,
    ) -> Result<Option<Quiz>, RepoError> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            r#"UPDATE quizzes
               SET title = COALESCE($2, title),
                   passing_score = COALESCE($3, passing_score)
               WHERE id = $1
               RETURNING {QUIZ_COLUMNS}"#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(req.passing_score)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// complete_quiz
    ///
    /// Loads the quiz and its ordered question set, scores the submission, then
    /// writes attempt + answers + the in-place score update inside one
    /// transaction. Rollback on any failure, so no attempt is left without its answers.
    async fn complete_quiz(
        &self,
        quiz_id: Uuid,
        enrollment_id: Uuid,
        answers: &[SubmittedAnswer],
    ) -> Result<QuizAttempt, RepoError> {
        let quiz = self.get_quiz(quiz_id).await?.ok_or(RepoError::NotFound)?;
        self.get_enrollment(enrollment_id)
            .await?
            .ok_or(RepoError::NotFound)?;

        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT id, quiz_id, prompt, correct_answer, order_index
               FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index ASC"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let outcome = score_submission(&questions, answers, quiz.passing_score);

        let mut tx = self.pool.begin().await?;

        let attempt_id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO quiz_attempts (id, quiz_id, enrollment_id, score, passed, completed_at)
               VALUES ($1, $2, $3, 0, false, NULL)"#,
        )
        .bind(attempt_id)
        .bind(quiz_id)
        .bind(enrollment_id)
        .execute(&mut *tx)
        .await?;

        for answer in &outcome.answers {
            sqlx::query(
                r#"INSERT INTO quiz_answers (id, attempt_id, question_id, answer, is_correct)
                   VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(Uuid::new_v4())
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(&answer.answer)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        // The attempt row is updated in place with the final outcome.
        let attempt = sqlx::query_as::<_, QuizAttempt>(&format!(
            r#"UPDATE quiz_attempts
               SET score = $2, passed = $3, completed_at = NOW()
               WHERE id = $1
               RETURNING {ATTEMPT_COLUMNS}"#
        ))
        .bind(attempt_id)
        .bind(outcome.score)
        .bind(outcome.passed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(attempt)
    }

    async fn list_attempts_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<QuizAttempt>, RepoError> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            r#"SELECT a.id, a.quiz_id, a.enrollment_id, a.score, a.passed, a.completed_at
               FROM quiz_attempts a
               JOIN course_enrollments e ON a.enrollment_id = e.id
               WHERE e.student_id = $1
               ORDER BY a.completed_at DESC NULLS LAST"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn get_attempt_detail(&self, id: Uuid) -> Result<Option<AttemptDetail>, RepoError> {
        let Some(attempt) = sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let answers = sqlx::query_as::<_, QuizAnswer>(
            r#"SELECT id, attempt_id, question_id, answer, is_correct
               FROM quiz_answers WHERE attempt_id = $1"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(AttemptDetail { attempt, answers }))
    }

    // --- Certificates ---

    async fn issue_certificate(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Certificate, RepoError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"INSERT INTO certificates (id, student_id, course_id, issued_at)
               VALUES ($1, $2, $3, NOW())
               RETURNING id, student_id, course_id, issued_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::not_found_on_fk)?;
        Ok(certificate)
    }

    async fn list_certificates_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<Certificate>, RepoError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            r#"SELECT id, student_id, course_id, issued_at
               FROM certificates WHERE student_id = $1 ORDER BY issued_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(certificates)
    }

    async fn get_certificate(&self, id: Uuid) -> Result<Option<Certificate>, RepoError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT id, student_id, course_id, issued_at FROM certificates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    // --- Jobs ---

    async fn list_open_jobs(&self) -> Result<Vec<Job>, RepoError> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_open = true ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, RepoError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> Result<Job, RepoError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"INSERT INTO jobs (id, company_id, title, description, is_open, created_at, updated_at)
               VALUES ($1, $2, $3, $4, true, NOW(), NOW())
               RETURNING {JOB_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&req.title)
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::not_found_on_fk)?;
        Ok(job)
    }

    /// update_job
    ///
    /// Owner-Only: the WHERE clause carries the ownership check, so a
    /// non-owner sees the same `None` as a missing row.
    async fn update_job(
        &self,
        id: Uuid,
        company_id: Uuid,
        req: UpdateJobRequest,
    ) -> Result<Option<Job>, RepoError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"UPDATE jobs
               SET title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   is_open = COALESCE($5, is_open),
                   updated_at = NOW()
               WHERE id = $1 AND company_id = $2
               RETURNING {JOB_COLUMNS}"#
        ))
        .bind(id)
        .bind(company_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.is_open)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn delete_job(&self, id: Uuid, company_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- External API Keys ---

    async fn create_api_key(&self, name: &str, key: &str) -> Result<ExternalApiKey, RepoError> {
        let api_key = sqlx::query_as::<_, ExternalApiKey>(&format!(
            r#"INSERT INTO external_api_keys (id, key, name, active, revoked_at, created_at)
               VALUES ($1, $2, $3, true, NULL, NOW())
               RETURNING {API_KEY_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(api_key)
    }

    async fn list_api_keys(&self) -> Result<Vec<ExternalApiKey>, RepoError> {
        let keys = sqlx::query_as::<_, ExternalApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM external_api_keys ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    /// revoke_api_key
    ///
    /// Unconditional revocation: `revoked_at` is stamped with the time of this
    /// call even if the key was already inactive, making the operation
    /// idempotent while keeping the timestamp fresh.
    async fn revoke_api_key(&self, id: Uuid) -> Result<Option<ExternalApiKey>, RepoError> {
        let api_key = sqlx::query_as::<_, ExternalApiKey>(&format!(
            r#"UPDATE external_api_keys SET active = false, revoked_at = NOW()
               WHERE id = $1
               RETURNING {API_KEY_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(api_key)
    }

    // --- Dashboards ---

    /// get_admin_stats
    ///
    /// Compiles all counters for the administrative dashboard in a single call.
    async fn get_admin_stats(&self) -> Result<AdminDashboardStats, RepoError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_courses = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        let total_enrollments =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course_enrollments")
                .fetch_one(&self.pool)
                .await?;
        let total_certificates = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;
        let open_jobs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE is_open = true")
            .fetch_one(&self.pool)
            .await?;

        Ok(AdminDashboardStats {
            total_users,
            total_courses,
            total_enrollments,
            total_certificates,
            open_jobs,
        })
    }

    async fn get_student_dashboard(
        &self,
        student_id: Uuid,
    ) -> Result<StudentDashboard, RepoError> {
        let active_enrollments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM course_enrollments WHERE student_id = $1 AND status = 'active'",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        let completed_enrollments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM course_enrollments WHERE student_id = $1 AND status = 'completed'",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        let passed_attempts = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM quiz_attempts a
               JOIN course_enrollments e ON a.enrollment_id = e.id
               WHERE e.student_id = $1 AND a.passed = true"#,
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        let certificates = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM certificates WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StudentDashboard {
            active_enrollments,
            completed_enrollments,
            passed_attempts,
            certificates,
        })
    }
}
