use serde::Deserialize;

use crate::{
    courses::repo_types::{CoursePatch, NewCourse},
    extract::present,
};

/// Request body for adding a course.
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    pub credits: i32,
    pub grade: f64,
    #[serde(default)]
    pub semester: Option<String>,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(r: CreateCourseRequest) -> Self {
        Self {
            code: r.code,
            title: r.title,
            credits: r.credits,
            grade: r.grade,
            semester: r.semester,
        }
    }
}

/// Request body for a partial update. Absent fields are left untouched;
/// `"semester": null` clears the semester.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub credits: Option<i32>,
    pub grade: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub semester: Option<Option<String>>,
}

impl From<UpdateCourseRequest> for CoursePatch {
    fn from(r: UpdateCourseRequest) -> Self {
        Self {
            code: r.code,
            title: r.title,
            credits: r.credits,
            grade: r.grade,
            semester: r.semester,
        }
    }
}
