//! Recommendations - published properties matching a buyer's budget and location
//!
//! Candidates are filtered, never ranked: up to [`RECOMMENDATION_LIMIT`] of them are drawn
//! uniformly at random.

use crate::core::{AppError, AppState};
use crate::entities::{Profile, Property};
use crate::repositories::Read;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

pub const RECOMMENDATION_LIMIT: usize = 4;

pub const MISSING_CRITERIA_NOTICE: &str =
    "Add a budget or a preferred location to your profile to get recommendations.";
pub const NO_MATCH_NOTICE: &str = "We couldn't find any properties that match your budget or location preferences. Try updating your profile!";

/// Inclusive price window around a budget: 80% to 120%, in exact integer arithmetic.
/// `budget` must be positive.
pub fn price_bounds(budget: i64) -> (i64, i64) {
    let budget = i128::from(budget);
    // ceil(b * 4 / 5) and floor(b * 6 / 5) for b > 0
    let min = (budget * 4 + 4) / 5;
    let max = (budget * 6) / 5;
    (
        i64::try_from(min).unwrap_or(i64::MAX),
        i64::try_from(max).unwrap_or(i64::MAX),
    )
}

/// Active criteria of a profile. At least one of the two is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationCriteria {
    budget: Option<i64>,
    /// Lower-cased needle
    location: Option<String>,
}

impl RecommendationCriteria {
    /// `None` when the profile has neither a positive budget nor a non-blank location:
    /// an empty profile must not match everything.
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let budget = profile.budget.filter(|b| *b > 0);
        let location = profile
            .preferred_location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_lowercase);

        if budget.is_none() && location.is_none() {
            return None;
        }
        Some(Self { budget, location })
    }

    pub fn price_bounds(&self) -> Option<(i64, i64)> {
        self.budget.map(price_bounds)
    }

    pub fn matches(&self, property: &Property) -> bool {
        let price_ok = self
            .price_bounds()
            .is_none_or(|(min, max)| (min..=max).contains(&property.price));
        let location_ok = self
            .location
            .as_deref()
            .is_none_or(|needle| property.location.to_lowercase().contains(needle));

        property.is_published && price_ok && location_ok
    }
}

/// Outcome of the recommendation step of the home page
#[derive(Debug, Clone)]
pub enum Recommendation {
    Matched(Vec<Property>),
    /// No profile, or a profile without budget and location
    MissingCriteria,
    NoMatch,
}

impl Recommendation {
    /// What the user should be told when nothing is recommended
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Recommendation::Matched(_) => None,
            Recommendation::MissingCriteria => Some(MISSING_CRITERIA_NOTICE),
            Recommendation::NoMatch => Some(NO_MATCH_NOTICE),
        }
    }

    pub fn into_properties(self) -> Vec<Property> {
        match self {
            Recommendation::Matched(properties) => properties,
            _ => Vec::new(),
        }
    }
}

/// Keeps the candidates matching `criteria` (minus the showcase) and samples up to
/// [`RECOMMENDATION_LIMIT`] of them.
pub fn pick_recommendations<R: Rng + ?Sized>(
    criteria: &RecommendationCriteria,
    candidates: Vec<Property>,
    showcase_id: Option<i64>,
    rng: &mut R,
) -> Recommendation {
    let mut pool: Vec<Property> = candidates
        .into_iter()
        .filter(|p| Some(p.property_id) != showcase_id)
        .filter(|p| criteria.matches(p))
        .collect();

    if pool.is_empty() {
        return Recommendation::NoMatch;
    }

    let (picked, _) = pool.partial_shuffle(rng, RECOMMENDATION_LIMIT);
    Recommendation::Matched(picked.to_vec())
}

/// Recommendations for `user_id`, never failing on a missing or empty profile.
#[instrument(skip(state))]
pub async fn recommend_for(
    state: &AppState,
    user_id: i64,
    showcase_id: Option<i64>,
) -> Result<Recommendation, AppError> {
    let Some(profile) = state.profile.read(&user_id).await? else {
        debug!("No profile, no recommendations");
        return Ok(Recommendation::MissingCriteria);
    };
    let Some(criteria) = RecommendationCriteria::from_profile(&profile) else {
        debug!("Profile has no recommendation criteria");
        return Ok(Recommendation::MissingCriteria);
    };

    // the price window is pushed down to SQL; the location match stays here so it is
    // Unicode case-insensitive
    let (min_price, max_price) = criteria.price_bounds().unzip();
    let candidates = state
        .property
        .find_published_in_price_range(min_price, max_price, showcase_id)
        .await?;
    debug!("{} candidates in price window", candidates.len());

    Ok(pick_recommendations(
        &criteria,
        candidates,
        showcase_id,
        &mut rand::thread_rng(),
    ))
}
