use std::collections::BTreeMap;

use super::domain::{Severity, ViolationCategory, ViolationCategoryId};
use super::repository::{RepositoryError, ViolationCategoryRepository};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("violation category {0:?} not found or inactive")]
    NotFound(ViolationCategoryId),
}

/// Active violation categories, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ViolationCatalog {
    categories: BTreeMap<ViolationCategoryId, ViolationCategory>,
}

impl ViolationCatalog {
    pub fn load<R>(repository: &R) -> Result<Self, RepositoryError>
    where
        R: ViolationCategoryRepository + ?Sized,
    {
        let categories = repository.active_categories()?;
        Ok(Self::from_categories(categories))
    }

    /// Build a catalog from any category list. Inactive entries are dropped. When an id
    /// appears more than once the last active entry wins.
    pub fn from_categories(categories: impl IntoIterator<Item = ViolationCategory>) -> Self {
        let categories = categories
            .into_iter()
            .filter(|category| category.is_active)
            .map(|category| (category.id.clone(), category))
            .collect();
        Self { categories }
    }

    /// Standard residential-care seed list.
    pub fn seeded() -> Self {
        Self::from_categories(seed_categories())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every severity tier in display order; empty tiers map to empty vectors.
    /// Within a tier categories are ordered by display order, then name.
    pub fn list_active_grouped_by_severity(&self) -> BTreeMap<Severity, Vec<ViolationCategory>> {
        let mut grouped: BTreeMap<Severity, Vec<ViolationCategory>> = Severity::ordered()
            .into_iter()
            .map(|severity| (severity, Vec::new()))
            .collect();

        for category in self.categories.values() {
            grouped
                .entry(category.severity)
                .or_default()
                .push(category.clone());
        }

        for tier in grouped.values_mut() {
            tier.sort_by(|left, right| {
                left.display_order
                    .cmp(&right.display_order)
                    .then_with(|| left.category_name.cmp(&right.category_name))
            });
        }

        grouped
    }

    pub fn resolve(&self, id: &ViolationCategoryId) -> Result<&ViolationCategory, CatalogError> {
        self.categories
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

impl ViolationCategoryRepository for ViolationCatalog {
    fn active_categories(&self) -> Result<Vec<ViolationCategory>, RepositoryError> {
        Ok(self.categories.values().cloned().collect())
    }
}

fn seed(
    id: &str,
    name: &str,
    severity: Severity,
    default_points: i32,
    display_order: u32,
) -> ViolationCategory {
    ViolationCategory {
        id: ViolationCategoryId(id.to_string()),
        category_name: name.to_string(),
        severity,
        default_points,
        display_order,
        is_active: true,
    }
}

fn seed_categories() -> Vec<ViolationCategory> {
    use Severity::*;

    vec![
        seed("tardy", "Tardiness", Minor, 1, 1),
        seed("dress-code", "Dress code violation", Minor, 1, 2),
        seed("phone-use", "Personal phone use on shift", Minor, 2, 3),
        seed("late-documentation", "Late shift documentation", Minor, 2, 4),
        seed("no-call-no-show", "No call / no show", Moderate, 4, 1),
        seed("left-shift-early", "Leaving shift without relief", Moderate, 3, 2),
        seed("missed-training", "Missed mandatory training", Moderate, 3, 3),
        seed("medication-error", "Medication administration error", Serious, 5, 1),
        seed("insubordination", "Insubordination", Serious, 6, 2),
        seed("privacy-breach", "Client privacy breach", Serious, 5, 3),
        seed("sleeping-on-shift", "Sleeping on awake shift", Critical, 8, 1),
        seed("unreported-incident", "Failure to report incident (245D)", Critical, 10, 2),
        seed("client-endangerment", "Leaving clients unattended", Critical, 10, 3),
        seed("maltreatment", "Maltreatment of a vulnerable adult", ImmediateTermination, 18, 1),
        seed("theft", "Theft of client funds or property", ImmediateTermination, 18, 2),
        seed("impairment", "Working under the influence", ImmediateTermination, 18, 3),
    ]
}
