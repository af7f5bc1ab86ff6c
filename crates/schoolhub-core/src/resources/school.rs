//! Sections, grade levels and subjects.

use crate::api::ApiError;
use crate::models::{GradeLevel, GradeLevelInput, Section, SectionInput, Subject, SubjectInput};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::keys;

#[derive(Clone, Copy)]
pub struct Sections<'a> {
    client: &'a SchoolClient,
}

impl<'a> Sections<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Section>>, ApiError> {
        self.client.fetch(&Query::new(keys::sections(), "/section")).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<Section>, ApiError> {
        let query = Query::new(keys::section(id), format!("/section/{}", id));
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &SectionInput) -> Result<Section, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/section")
            .json(input)?
            .invalidates([keys::sections(), keys::grade_levels()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &SectionInput) -> Result<Section, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/section/{}", id))
            .json(input)?
            .invalidates([keys::sections(), keys::section(id), keys::grade_levels()]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/section/{}", id))
            .invalidates([keys::sections(), keys::section(id), keys::grade_levels()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub struct GradeLevels<'a> {
    client: &'a SchoolClient,
}

impl<'a> GradeLevels<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<GradeLevel>>, ApiError> {
        self.client.fetch(&Query::new(keys::grade_levels(), "/gradeLevel")).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<GradeLevel>, ApiError> {
        let query = Query::new(keys::grade_level(id), format!("/gradeLevel/{}", id));
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &GradeLevelInput) -> Result<GradeLevel, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/gradeLevel")
            .json(input)?
            .invalidates([keys::grade_levels()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &GradeLevelInput) -> Result<GradeLevel, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/gradeLevel/{}", id))
            .json(input)?
            .invalidates([
                keys::grade_levels(),
                keys::grade_level(id),
                keys::subjects(),
                keys::subjects_for_grade(id),
            ]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/gradeLevel/{}", id)).invalidates([
            keys::grade_levels(),
            keys::grade_level(id),
            keys::subjects(),
            keys::subjects_for_grade(id),
            keys::sections(),
        ]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub struct Subjects<'a> {
    client: &'a SchoolClient,
}

impl<'a> Subjects<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Subject>>, ApiError> {
        self.client.fetch(&Query::new(keys::subjects(), "/subject")).await
    }

    /// Subjects taught in one grade level; disabled until a grade is chosen
    pub async fn for_grade_level(self, grade_level_id: Option<i64>) -> Result<QueryOutcome<Vec<Subject>>, ApiError> {
        let id = grade_level_id.unwrap_or_default();
        let query = Query::new(keys::subjects_for_grade(id), format!("/subject/gradeLevel/{}", id))
            .when(grade_level_id.is_some());
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &SubjectInput) -> Result<Subject, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/subject").json(input)?.invalidates([
            keys::subjects(),
            keys::subjects_for_grade(input.grade_level_id),
            keys::grade_levels(),
        ]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &SubjectInput) -> Result<Subject, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/subject/{}", id)).json(input)?.invalidates([
            keys::subjects(),
            keys::subjects_for_grade(input.grade_level_id),
            keys::grade_levels(),
        ]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/subject/{}", id))
            .invalidates([keys::subjects(), keys::grade_levels()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}
