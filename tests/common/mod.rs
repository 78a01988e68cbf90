#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use skillbridge::{
    AppState,
    auth,
    config::AppConfig,
    error::RepoError,
    models::{
        AdminDashboardStats, AttemptDetail, Certificate, Course, CourseEnrollment, CourseModule,
        CreateCourseRequest, CreateJobRequest, CreateLessonRequest, CreateModuleRequest,
        CreateQuizRequest, CreateResourceRequest, EnrollmentDetail, ExternalApiKey, Job, Lesson,
        LessonResource, PrincipalRecord, Profile, Quiz, QuizAttempt, QuizView, RefreshToken,
        RegisterUserRequest, StudentDashboard, SubmittedAnswer, TenantAccount, TenantKind,
        UpdateCourseRequest, UpdateJobRequest, UpdateLessonRequest, UpdateModuleRequest,
        UpdateProfileRequest, UpdateQuizRequest, User,
    },
    notify::MockNotifier,
    repository::Repository,
    storage::MockStorageService,
};

pub const STUDENT_ID: Uuid = Uuid::from_u128(1);
pub const ADMIN_ID: Uuid = Uuid::from_u128(2);
pub const SUPERADMIN_ID: Uuid = Uuid::from_u128(3);
pub const COMPANY_ID: Uuid = Uuid::from_u128(4);
pub const OTHER_STUDENT_ID: Uuid = Uuid::from_u128(99);

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Central control point for handler tests: canned outputs per method family,
// plus recorders for the calls whose absence/presence tests assert on.
pub struct MockRepo {
    pub principal_by_username: Option<PrincipalRecord>,
    pub principal_by_id: Option<PrincipalRecord>,
    // Records (tenant, id) for every password update so tests can assert the
    // stored hash was (or was not) touched.
    pub password_updates: Mutex<Vec<(TenantKind, Uuid)>>,
    pub refresh_tokens_created: Mutex<Vec<String>>,
    pub consume_refresh_result: Option<RefreshToken>,
    pub profile: Option<Profile>,
    pub course: Option<Course>,
    pub courses: Vec<Course>,
    pub delete_result: bool,
    pub enrollment_conflict: bool,
    pub enrollment: Option<CourseEnrollment>,
    pub enrollments: Vec<CourseEnrollment>,
    pub enrollment_detail: Option<EnrollmentDetail>,
    pub tenant_account: Option<TenantAccount>,
    pub quiz: Option<Quiz>,
    pub quiz_view: Option<QuizView>,
    pub attempt: Option<QuizAttempt>,
    pub attempt_detail: Option<AttemptDetail>,
    pub attempts: Vec<QuizAttempt>,
    pub certificate: Option<Certificate>,
    pub certificates: Vec<Certificate>,
    pub job: Option<Job>,
    pub jobs: Vec<Job>,
    pub api_key: Option<ExternalApiKey>,
    pub api_keys: Vec<ExternalApiKey>,
    pub stats: AdminDashboardStats,
    pub dashboard: StudentDashboard,
}

impl Default for MockRepo {
    fn default() -> Self {
        MockRepo {
            principal_by_username: None,
            principal_by_id: None,
            password_updates: Mutex::new(vec![]),
            refresh_tokens_created: Mutex::new(vec![]),
            consume_refresh_result: None,
            profile: None,
            course: None,
            courses: vec![],
            delete_result: true,
            enrollment_conflict: false,
            enrollment: None,
            enrollments: vec![],
            enrollment_detail: None,
            tenant_account: None,
            quiz: None,
            quiz_view: None,
            attempt: None,
            attempt_detail: None,
            attempts: vec![],
            certificate: None,
            certificates: vec![],
            job: None,
            jobs: vec![],
            api_key: None,
            api_keys: vec![],
            stats: AdminDashboardStats::default(),
            dashboard: StudentDashboard::default(),
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn find_principal_by_username(
        &self,
        _kind: TenantKind,
        _username: &str,
    ) -> Result<Option<PrincipalRecord>, RepoError> {
        Ok(self.principal_by_username.clone())
    }

    async fn find_principal_by_id(
        &self,
        _kind: TenantKind,
        _id: Uuid,
    ) -> Result<Option<PrincipalRecord>, RepoError> {
        Ok(self.principal_by_id.clone())
    }

    async fn update_password_hash(
        &self,
        kind: TenantKind,
        id: Uuid,
        _new_hash: &str,
    ) -> Result<bool, RepoError> {
        self.password_updates.lock().unwrap().push((kind, id));
        Ok(true)
    }

    async fn register_user(
        &self,
        _password_hash: &str,
        req: &RegisterUserRequest,
    ) -> Result<(User, Profile), RepoError> {
        let user_id = Uuid::new_v4();
        Ok((
            User {
                id: user_id,
                username: req.username.clone(),
                role: "student".to_string(),
                created_at: Utc::now(),
            },
            Profile {
                user_id,
                first_name: req.first_name.clone(),
                last_name: req.last_name.clone(),
                education_level: req.education_level.clone(),
                skills: req.skills.clone(),
            },
        ))
    }

    async fn get_tenant_account(
        &self,
        _kind: TenantKind,
        _id: Uuid,
    ) -> Result<Option<TenantAccount>, RepoError> {
        Ok(self.tenant_account.clone())
    }

    async fn get_profile(&self, _user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.profile.clone())
    }

    async fn update_profile(
        &self,
        _user_id: Uuid,
        _req: UpdateProfileRequest,
    ) -> Result<Option<Profile>, RepoError> {
        Ok(self.profile.clone())
    }

    async fn create_refresh_token(
        &self,
        _user_id: Uuid,
        token: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.refresh_tokens_created
            .lock()
            .unwrap()
            .push(token.to_string());
        Ok(())
    }

    async fn consume_refresh_token(
        &self,
        _token: &str,
    ) -> Result<Option<RefreshToken>, RepoError> {
        Ok(self.consume_refresh_result.clone())
    }

    async fn list_courses(&self, _published_only: bool) -> Result<Vec<Course>, RepoError> {
        Ok(self.courses.clone())
    }

    async fn get_course(&self, _id: Uuid) -> Result<Option<Course>, RepoError> {
        Ok(self.course.clone())
    }

    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, RepoError> {
        Ok(Course {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            is_published: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn update_course(
        &self,
        _id: Uuid,
        _req: UpdateCourseRequest,
    ) -> Result<Option<Course>, RepoError> {
        Ok(self.course.clone())
    }

    async fn delete_course(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn create_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, RepoError> {
        Ok(CourseModule {
            id: Uuid::new_v4(),
            course_id,
            title: req.title,
            order_index: req.order_index,
        })
    }

    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>, RepoError> {
        Ok(Some(CourseModule {
            id,
            course_id: Uuid::new_v4(),
            title: req.title.unwrap_or_default(),
            order_index: req.order_index.unwrap_or_default(),
        }))
    }

    async fn delete_module(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn create_lesson(
        &self,
        module_id: Uuid,
        req: CreateLessonRequest,
    ) -> Result<Lesson, RepoError> {
        Ok(Lesson {
            id: Uuid::new_v4(),
            module_id,
            title: req.title,
            content: req.content,
            order_index: req.order_index,
        })
    }

    async fn update_lesson(
        &self,
        id: Uuid,
        req: UpdateLessonRequest,
    ) -> Result<Option<Lesson>, RepoError> {
        Ok(Some(Lesson {
            id,
            module_id: Uuid::new_v4(),
            title: req.title.unwrap_or_default(),
            content: req.content.unwrap_or_default(),
            order_index: req.order_index.unwrap_or_default(),
        }))
    }

    async fn delete_lesson(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn add_lesson_resource(
        &self,
        lesson_id: Uuid,
        req: CreateResourceRequest,
    ) -> Result<LessonResource, RepoError> {
        Ok(LessonResource {
            id: Uuid::new_v4(),
            lesson_id,
            title: req.title,
            url: req.url,
        })
    }

    async fn delete_lesson_resource(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn create_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseEnrollment, RepoError> {
        if self.enrollment_conflict {
            return Err(RepoError::Conflict(
                "Student is already enrolled in this course".to_string(),
            ));
        }
        Ok(CourseEnrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            status: "active".to_string(),
            enrolled_at: Utc::now(),
        })
    }

    async fn get_enrollment(&self, _id: Uuid) -> Result<Option<CourseEnrollment>, RepoError> {
        Ok(self.enrollment.clone())
    }

    async fn list_enrollments_for_student(
        &self,
        _student_id: Uuid,
    ) -> Result<Vec<CourseEnrollment>, RepoError> {
        Ok(self.enrollments.clone())
    }

    async fn list_enrollments(&self) -> Result<Vec<CourseEnrollment>, RepoError> {
        Ok(self.enrollments.clone())
    }

    async fn set_enrollment_status(
        &self,
        _id: Uuid,
        status: &str,
    ) -> Result<Option<CourseEnrollment>, RepoError> {
        Ok(self.enrollment.clone().map(|mut e| {
            e.status = status.to_string();
            e
        }))
    }

    async fn get_enrollment_detail(
        &self,
        _id: Uuid,
    ) -> Result<Option<EnrollmentDetail>, RepoError> {
        Ok(self.enrollment_detail.clone())
    }

    async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz, RepoError> {
        Ok(Quiz {
            id: Uuid::new_v4(),
            course_id: req.course_id,
            lesson_id: req.lesson_id,
            title: req.title,
            passing_score: req.passing_score,
            created_at: Utc::now(),
        })
    }

    async fn get_quiz(&self, _id: Uuid) -> Result<Option<Quiz>, RepoError> {
        Ok(self.quiz.clone())
    }

    async fn get_quiz_view(&self, _id: Uuid) -> Result<Option<QuizView>, RepoError> {
        Ok(self.quiz_view.clone())
    }

    async fn update_quiz(
        &self,
        _id: Uuid,
        _req: UpdateQuizRequest,
    ) -> Result<Option<Quiz>, RepoError> {
        Ok(self.quiz.clone())
    }

    async fn delete_quiz(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn complete_quiz(
        &self,
        _quiz_id: Uuid,
        _enrollment_id: Uuid,
        _answers: &[SubmittedAnswer],
    ) -> Result<QuizAttempt, RepoError> {
        self.attempt.clone().ok_or(RepoError::NotFound)
    }

    async fn list_attempts_for_student(
        &self,
        _student_id: Uuid,
    ) -> Result<Vec<QuizAttempt>, RepoError> {
        Ok(self.attempts.clone())
    }

    async fn get_attempt_detail(&self, _id: Uuid) -> Result<Option<AttemptDetail>, RepoError> {
        Ok(self.attempt_detail.clone())
    }

    async fn issue_certificate(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Certificate, RepoError> {
        Ok(self.certificate.clone().unwrap_or(Certificate {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            issued_at: Utc::now(),
        }))
    }

    async fn list_certificates_for_student(
        &self,
        _student_id: Uuid,
    ) -> Result<Vec<Certificate>, RepoError> {
        Ok(self.certificates.clone())
    }

    async fn get_certificate(&self, _id: Uuid) -> Result<Option<Certificate>, RepoError> {
        Ok(self.certificate.clone())
    }

    async fn list_open_jobs(&self) -> Result<Vec<Job>, RepoError> {
        Ok(self.jobs.clone())
    }

    async fn get_job(&self, _id: Uuid) -> Result<Option<Job>, RepoError> {
        Ok(self.job.clone())
    }

    async fn create_job(&self, company_id: Uuid, req: CreateJobRequest) -> Result<Job, RepoError> {
        Ok(Job {
            id: Uuid::new_v4(),
            company_id,
            title: req.title,
            description: req.description,
            is_open: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn update_job(
        &self,
        _id: Uuid,
        _company_id: Uuid,
        _req: UpdateJobRequest,
    ) -> Result<Option<Job>, RepoError> {
        Ok(self.job.clone())
    }

    async fn delete_job(&self, _id: Uuid, _company_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.delete_result)
    }

    async fn create_api_key(&self, name: &str, key: &str) -> Result<ExternalApiKey, RepoError> {
        Ok(ExternalApiKey {
            id: Uuid::new_v4(),
            key: key.to_string(),
            name: name.to_string(),
            active: true,
            revoked_at: None,
            created_at: Utc::now(),
        })
    }

    async fn list_api_keys(&self) -> Result<Vec<ExternalApiKey>, RepoError> {
        Ok(self.api_keys.clone())
    }

    async fn revoke_api_key(&self, _id: Uuid) -> Result<Option<ExternalApiKey>, RepoError> {
        Ok(self.api_key.clone())
    }

    async fn get_admin_stats(&self) -> Result<AdminDashboardStats, RepoError> {
        Ok(self.stats.clone())
    }

    async fn get_student_dashboard(
        &self,
        _student_id: Uuid,
    ) -> Result<StudentDashboard, RepoError> {
        Ok(self.dashboard.clone())
    }
}

// --- TEST UTILITIES ---

/// Creates an AppState from mock components.
pub fn test_state(repo: MockRepo, storage: MockStorageService) -> AppState {
    test_state_with_notifier(repo, storage, Arc::new(MockNotifier::new()))
}

/// Variant keeping the concrete `Arc<MockRepo>` so tests can assert on the
/// recorder fields after the handler ran.
pub fn test_state_with_repo(repo: Arc<MockRepo>, storage: MockStorageService) -> AppState {
    AppState {
        repo: repo as skillbridge::RepositoryState,
        storage: Arc::new(storage),
        notifier: Arc::new(MockNotifier::new()),
        config: AppConfig::default(),
    }
}

pub fn test_state_with_notifier(
    repo: MockRepo,
    storage: MockStorageService,
    notifier: Arc<MockNotifier>,
) -> AppState {
    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(storage),
        notifier,
        config: AppConfig::default(),
    }
}

/// A credential row whose password is the given plaintext.
pub fn principal_record(
    id: Uuid,
    username: &str,
    password: &str,
    role: &str,
    is_active: bool,
) -> PrincipalRecord {
    PrincipalRecord {
        id,
        username: username.to_string(),
        password_hash: auth::hash_password(password).expect("hashing in test setup"),
        role: role.to_string(),
        is_active,
    }
}

pub fn student_principal() -> auth::AuthPrincipal {
    auth::AuthPrincipal {
        id: STUDENT_ID,
        username: "youth1".to_string(),
        role: "student".to_string(),
        tenant: TenantKind::User,
    }
}

pub fn admin_principal() -> auth::AuthPrincipal {
    auth::AuthPrincipal {
        id: ADMIN_ID,
        username: "admin".to_string(),
        role: "admin".to_string(),
        tenant: TenantKind::User,
    }
}

pub fn superadmin_principal() -> auth::AuthPrincipal {
    auth::AuthPrincipal {
        id: SUPERADMIN_ID,
        username: "root".to_string(),
        role: "superadmin".to_string(),
        tenant: TenantKind::User,
    }
}

pub fn company_principal() -> auth::AuthPrincipal {
    auth::AuthPrincipal {
        id: COMPANY_ID,
        username: "acme".to_string(),
        role: "company".to_string(),
        tenant: TenantKind::Company,
    }
}
