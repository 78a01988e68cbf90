use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Tenant Model ---

/// TenantKind
///
/// The four account families that can authenticate against this API. Tokens carry
/// the kind as the `tenant` claim, and the login/verify/issue-token routine is
/// parameterized by it instead of being copied per account family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TenantKind {
    Company,
    Institution,
    Municipality,
    /// Youth/user accounts (the student side of the platform).
    #[default]
    User,
}

impl TenantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantKind::Company => "company",
            TenantKind::Institution => "institution",
            TenantKind::Municipality => "municipality",
            TenantKind::User => "user",
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record for a youth/user account (`users` table).
/// The password hash is deliberately absent; credential checks go through
/// `PrincipalRecord`, which is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    // RBAC field: 'student', 'admin' or 'superadmin'.
    pub role: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Profile
///
/// The 1:1 extension of a youth account (`profiles` table). Created atomically
/// with its `User` during registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub education_level: Option<String>,
    // Freeform skill tags, stored as a Postgres TEXT[].
    pub skills: Vec<String>,
}

/// TenantAccount
///
/// Shared row shape of the `companies`, `institutions` and `municipalities`
/// tables. The three tables are structurally identical, so one Rust type maps
/// all of them; the owning table is implied by the query.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TenantAccount {
    pub id: Uuid,
    pub username: String,
    // Display name of the organisation.
    pub name: String,
    // Inactive accounts cannot authenticate.
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// PrincipalRecord
///
/// Internal credential row resolved during login and token verification: any of
/// the four account families reduced to the fields authentication needs.
/// Never leaves the process; no Serialize on purpose.
#[derive(Debug, Clone, FromRow, Default)]
pub struct PrincipalRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

/// Job
///
/// A company-owned job posting (`jobs` table). Self-service: only the owning
/// company mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_open: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Course
///
/// Top of the course → module → lesson hierarchy (`courses` table).
/// Unpublished courses are visible to admins only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CourseModule
///
/// Ordered child of a course. `order_index` defines display order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseModule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
}

/// Lesson
///
/// Ordered child of a module.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub content: String,
    pub order_index: i32,
}

/// LessonResource
///
/// Freeform resource attached to a lesson (external links, files).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct LessonResource {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub url: String,
}

/// CourseEnrollment
///
/// Links a student to a course (`course_enrollments` table). The
/// (student_id, course_id) pair carries a unique constraint; duplicate inserts
/// surface as a Conflict with a fixed message.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseEnrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    // 'active', 'completed' or 'dropped'.
    pub status: String,
    #[ts(type = "string")]
    pub enrolled_at: DateTime<Utc>,
}

/// Quiz
///
/// Belongs to either a course or a lesson: exactly one of the two foreign keys
/// is set (checked at create time and by a DB constraint).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub title: String,
    // Minimum score (0..=100) required to pass.
    pub passing_score: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// QuizQuestion
///
/// Internal row including the stored correct answer. Students only ever see the
/// redacted `QuestionView`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub prompt: String,
    pub correct_answer: String,
    pub order_index: i32,
}

/// QuizAttempt
///
/// One completion of a quiz by an enrollment. `score` and `passed` are derived
/// from answer correctness during completion and are never client-settable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub enrollment_id: Uuid,
    pub score: i32,
    pub passed: bool,
    #[ts(type = "string | null")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// QuizAnswer
///
/// One recorded answer row, annotated with its correctness flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct QuizAnswer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
}

/// Certificate
///
/// Links a student to a completed course.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Certificate {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[ts(type = "string")]
    pub issued_at: DateTime<Utc>,
}

/// RefreshToken
///
/// Single-use token row for youth sessions. Internal: the API only ever returns
/// the opaque token string, never this row.
#[derive(Debug, Clone, FromRow, Default)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// ExternalApiKey
///
/// Process-wide credential for external integrations. Only a SUPERADMIN
/// principal may create or revoke; revocation is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ExternalApiKey {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub active: bool,
    #[ts(type = "string | null")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Shared input for all four login flows.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RegisterUserRequest
///
/// Input for youth registration. The user row and its profile are created in
/// one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub education_level: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// ChangePasswordRequest
///
/// Requires re-verification of the current password before the replacement is
/// hashed and stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// RefreshRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// UpdateProfileRequest
///
/// Partial update; only provided fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

/// CreateCourseRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
}

/// UpdateCourseRequest
///
/// Partial update payload, `COALESCE`d column by column in the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// CreateModuleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateModuleRequest {
    pub title: String,
    pub order_index: i32,
}

/// UpdateModuleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateModuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

/// CreateLessonRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: String,
    pub order_index: i32,
}

/// UpdateLessonRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateLessonRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

/// CreateResourceRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateResourceRequest {
    pub title: String,
    pub url: String,
}

/// CreateEnrollmentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateEnrollmentRequest {
    pub course_id: Uuid,
}

/// UpdateEnrollmentStatusRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateEnrollmentStatusRequest {
    // 'active', 'completed' or 'dropped'.
    pub status: String,
}

/// NewQuestion
///
/// Question payload inside quiz creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewQuestion {
    pub prompt: String,
    pub correct_answer: String,
}

/// CreateQuizRequest
///
/// Exactly one of `course_id` / `lesson_id` must be set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateQuizRequest {
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<NewQuestion>,
}

/// UpdateQuizRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateQuizRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing_score: Option<i32>,
}

/// SubmittedAnswer
///
/// One answer in a quiz submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: String,
}

/// CompleteQuizRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CompleteQuizRequest {
    pub enrollment_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
}

/// CreateJobRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
}

/// UpdateJobRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
}

/// IssueCertificateRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct IssueCertificateRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
}

/// CreateApiKeyRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

// --- Response Schemas (Output) ---

/// AccountSummary
///
/// The principal's non-secret fields, returned by every login flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub tenant: TenantKind,
}

/// LoginResponse
///
/// The signed access token plus the authenticated principal. Youth logins also
/// carry a single-use refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    // Access-token lifetime in seconds.
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub account: AccountSummary,
}

/// RegisteredUser
///
/// Output of youth registration: the created user row and its profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisteredUser {
    pub user: User,
    pub profile: Profile,
}

/// QuestionView
///
/// Redacted question shape for quiz takers; no correct answer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuestionView {
    pub id: Uuid,
    pub prompt: String,
    pub order_index: i32,
}

impl From<QuizQuestion> for QuestionView {
    fn from(q: QuizQuestion) -> Self {
        QuestionView {
            id: q.id,
            prompt: q.prompt,
            order_index: q.order_index,
        }
    }
}

/// QuizView
///
/// A quiz with its ordered, redacted question set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuizView {
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<QuestionView>,
}

/// AttemptDetail
///
/// An attempt with its recorded answer rows, for post-completion review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AttemptDetail {
    pub attempt: QuizAttempt,
    pub answers: Vec<QuizAnswer>,
}

/// LessonDetail
///
/// A lesson enriched with its resource list and lesson-scoped quizzes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub resources: Vec<LessonResource>,
    pub quizzes: Vec<Quiz>,
}

/// ModuleDetail
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ModuleDetail {
    pub module: CourseModule,
    pub lessons: Vec<LessonDetail>,
}

/// EnrollmentDetail
///
/// The enriched enrollment structure: course → ordered modules → ordered
/// lessons, each lesson carrying resources and quizzes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EnrollmentDetail {
    pub enrollment: CourseEnrollment,
    pub course: Course,
    pub modules: Vec<ModuleDetail>,
}

/// UploadResponse
///
/// Public URL of a stored object plus the object key for later reference.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}

// --- Dashboard Schemas (Output) ---

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_certificates: i64,
    pub open_jobs: i64,
}

/// StudentDashboard
///
/// Activity summary for the authenticated youth account (GET /me/dashboard).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct StudentDashboard {
    pub active_enrollments: i64,
    pub completed_enrollments: i64,
    pub passed_attempts: i64,
    pub certificates: i64,
}
