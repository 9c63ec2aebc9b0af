use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// A course record, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub owner_email: String,
    pub code: String,
    pub title: String,
    pub credits: i32,
    pub grade: f64, // grade points, 0.0..=4.0
    pub semester: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: String,
    pub title: String,
    pub credits: i32,
    pub grade: f64,
    pub semester: Option<String>,
}

/// Partial update. `None` leaves a column alone; for `semester`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub code: Option<String>,
    pub title: Option<String>,
    pub credits: Option<i32>,
    pub grade: Option<f64>,
    pub semester: Option<Option<String>>,
}

impl CoursePatch {
    pub fn apply(self, course: &mut Course) {
        if let Some(code) = self.code {
            course.code = code;
        }
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(credits) = self.credits {
            course.credits = credits;
        }
        if let Some(grade) = self.grade {
            course.grade = grade;
        }
        if let Some(semester) = self.semester {
            course.semester = semester;
        }
    }
}
