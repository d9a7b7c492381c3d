use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingDay {
    pub id: Uuid,
    pub program_id: Uuid,
    pub title: String,
    pub day_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub target_sets: i32,
    pub target_reps: i32,
    pub target_weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/programs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProgramRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be under 1000 characters"))]
    pub description: Option<String>,
}

/// PUT /api/programs/:id — partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProgramRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be under 1000 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,
}

/// POST /api/programs/:id/days
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrainingDayRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Position within the program. Default: after the last day
    #[validate(range(min = 0, max = 1000))]
    pub order: Option<i32>,
}

/// POST /api/programs/:id/days/:day_id/exercises
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 1, max = 100, message = "Sets must be 1-100"))]
    pub target_sets: i32,

    #[validate(range(min = 1, max = 1000, message = "Reps must be 1-1000"))]
    pub target_reps: i32,

    #[validate(range(min = 0.0, max = 10000.0, message = "Weight must be 0-10000"))]
    #[serde(default)]
    pub target_weight: f64,
}

/// PUT /api/programs/:id/days/:day_id/exercises/:exercise_id — partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExerciseRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Sets must be 1-100"))]
    pub target_sets: Option<i32>,

    #[validate(range(min = 1, max = 1000, message = "Reps must be 1-1000"))]
    pub target_reps: Option<i32>,

    #[validate(range(min = 0.0, max = 10000.0, message = "Weight must be 0-10000"))]
    pub target_weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TrainingDayWithExercises {
    #[serde(flatten)]
    pub day: TrainingDay,
    pub exercises: Vec<Exercise>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_exercise_defaults_weight() {
        let json = r#"{"name":"Bench Press","target_sets":4,"target_reps":8}"#;
        let req: CreateExerciseRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.target_weight, 0.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_exercise_rejects_zero_sets() {
        let req = CreateExerciseRequest {
            name: "Squat".into(),
            target_sets: 0,
            target_reps: 5,
            target_weight: 100.0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_program_requires_name() {
        let req = CreateProgramRequest {
            name: String::new(),
            description: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_day_with_exercises_flattens_day() {
        let day = TrainingDay {
            id: Uuid::nil(),
            program_id: Uuid::nil(),
            title: "Chest & Triceps".into(),
            day_order: 0,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(TrainingDayWithExercises {
            day,
            exercises: vec![],
        })
        .unwrap();
        assert_eq!(json["title"], "Chest & Triceps");
        assert!(json["exercises"].as_array().unwrap().is_empty());
    }
}
