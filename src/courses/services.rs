use serde::Serialize;

use crate::{
    courses::{
        repo::CourseStore,
        repo_types::{Course, CoursePatch, NewCourse},
    },
    error::AppError,
};

pub const MAX_GRADE: f64 = 4.0;

fn check_credits(credits: i32) -> Result<(), AppError> {
    if credits < 0 {
        return Err(AppError::validation("credits", "credits must be >= 0"));
    }
    Ok(())
}

fn check_grade(grade: f64) -> Result<(), AppError> {
    if !grade.is_finite() || !(0.0..=MAX_GRADE).contains(&grade) {
        return Err(AppError::validation(
            "grade",
            "grade must be between 0.0 and 4.0",
        ));
    }
    Ok(())
}

pub async fn list(store: &dyn CourseStore, owner: &str) -> Result<Vec<Course>, AppError> {
    store.list(owner).await
}

pub async fn create(
    store: &dyn CourseStore,
    owner: &str,
    new: NewCourse,
) -> Result<Course, AppError> {
    check_credits(new.credits)?;
    check_grade(new.grade)?;
    store.insert(owner, new).await
}

pub async fn update(
    store: &dyn CourseStore,
    owner: &str,
    id: i64,
    patch: CoursePatch,
) -> Result<Course, AppError> {
    if let Some(credits) = patch.credits {
        check_credits(credits)?;
    }
    if let Some(grade) = patch.grade {
        check_grade(grade)?;
    }
    store
        .update(owner, id, patch)
        .await?
        .ok_or(AppError::NotFound("Course"))
}

pub async fn delete(store: &dyn CourseStore, owner: &str, id: i64) -> Result<(), AppError> {
    if store.delete(owner, id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Course"))
    }
}

/// Credit-weighted grade point average over one owner's courses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaSummary {
    pub total_credits: i64,
    pub total_weighted_points: f64,
    pub gpa: f64,
    pub count: usize,
}

pub fn summarize(courses: &[Course]) -> GpaSummary {
    let total_credits: i64 = courses.iter().map(|c| i64::from(c.credits)).sum();
    let total_weighted_points: f64 = courses.iter().map(|c| f64::from(c.credits) * c.grade).sum();
    let gpa = if total_credits > 0 {
        total_weighted_points / total_credits as f64
    } else {
        0.0
    };
    GpaSummary {
        total_credits,
        total_weighted_points,
        gpa,
        count: courses.len(),
    }
}

pub async fn summary(store: &dyn CourseStore, owner: &str) -> Result<GpaSummary, AppError> {
    let courses = store.list(owner).await?;
    Ok(summarize(&courses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn course(credits: i32, grade: f64) -> NewCourse {
        NewCourse {
            code: format!("C{credits}"),
            title: "Course".into(),
            credits,
            grade,
            semester: None,
        }
    }

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(
            summarize(&[]),
            GpaSummary {
                total_credits: 0,
                total_weighted_points: 0.0,
                gpa: 0.0,
                count: 0,
            }
        );
    }

    #[tokio::test]
    async fn weighted_average() {
        let store = MemoryStore::new();
        create(&store, "a@x.io", course(3, 4.0)).await.unwrap();
        create(&store, "a@x.io", course(4, 3.0)).await.unwrap();

        let s = summary(&store, "a@x.io").await.unwrap();
        assert_eq!(s.total_credits, 7);
        assert_eq!(s.total_weighted_points, 24.0);
        assert!((s.gpa - 24.0 / 7.0).abs() < 1e-9);
        assert_eq!(s.count, 2);
    }

    #[tokio::test]
    async fn zero_credit_courses_do_not_divide_by_zero() {
        let store = MemoryStore::new();
        create(&store, "a@x.io", course(0, 3.5)).await.unwrap();
        let s = summary(&store, "a@x.io").await.unwrap();
        assert_eq!(s.gpa, 0.0);
        assert_eq!(s.count, 1);
    }

    #[tokio::test]
    async fn rejects_out_of_range_values() {
        let store = MemoryStore::new();
        for (credits, grade, field) in [(-1, 3.0, "credits"), (3, 4.01, "grade"), (3, -0.5, "grade")] {
            let err = create(&store, "a@x.io", course(credits, grade)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { field: f, .. } if f == field));
        }
        assert!(list(&store, "a@x.io").await.unwrap().is_empty());

        create(&store, "a@x.io", course(0, 0.0)).await.unwrap();
        create(&store, "a@x.io", course(5, 4.0)).await.unwrap();
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let store = MemoryStore::new();
        let mut new = course(3, 3.0);
        new.semester = Some("Spring 2025".into());
        let before = create(&store, "a@x.io", new).await.unwrap();

        let after = update(
            &store,
            "a@x.io",
            before.id,
            CoursePatch {
                grade: Some(3.7),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(after.grade, 3.7);
        assert_eq!(after.code, before.code);
        assert_eq!(after.title, before.title);
        assert_eq!(after.credits, before.credits);
        assert_eq!(after.semester, before.semester);
    }

    #[tokio::test]
    async fn update_revalidates_changed_numbers() {
        let store = MemoryStore::new();
        let c = create(&store, "a@x.io", course(3, 3.0)).await.unwrap();
        let err = update(
            &store,
            "a@x.io",
            c.id,
            CoursePatch {
                grade: Some(5.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "grade", .. }));
        assert_eq!(list(&store, "a@x.io").await.unwrap()[0].grade, 3.0);
    }

    #[tokio::test]
    async fn foreign_records_look_missing() {
        let store = MemoryStore::new();
        let c = create(&store, "a@x.io", course(3, 3.0)).await.unwrap();

        let err = update(&store, "b@x.io", c.id, CoursePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete(&store, "b@x.io", c.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete(&store, "a@x.io", 9999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(list(&store, "a@x.io").await.unwrap().len(), 1);
        assert!(list(&store, "b@x.io").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = MemoryStore::new();
        let c = create(&store, "a@x.io", course(3, 3.0)).await.unwrap();
        delete(&store, "a@x.io", c.id).await.unwrap();
        let err = delete(&store, "a@x.io", c.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        let first = create(&store, "a@x.io", course(1, 2.0)).await.unwrap();
        let second = create(&store, "a@x.io", course(2, 3.0)).await.unwrap();
        let ids: Vec<i64> = list(&store, "a@x.io")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
