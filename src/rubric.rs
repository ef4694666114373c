use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RubricCriterion {
    pub name: &'static str,
    pub description: &'static str,
    pub weight: f64,
}

pub const RUBRIC: [RubricCriterion; 11] = [
    RubricCriterion {
        name: "Positive Language",
        description: "Contains positive words/phrases (e.g., good, great, excellent, love)",
        weight: 1.0,
    },
    RubricCriterion {
        name: "Negative Language",
        description: "Contains negative words/phrases (e.g., bad, poor, terrible, hate)",
        weight: -1.0,
    },
    RubricCriterion {
        name: "Explicit Recommendation",
        description: "Explicitly recommends the product/service to others",
        weight: 2.0,
    },
    RubricCriterion {
        name: "Explicit Discouragement",
        description: "Explicitly discourages others from the product/service",
        weight: -2.0,
    },
    RubricCriterion {
        name: "Satisfaction Expression",
        description: "Clearly expresses satisfaction with experience",
        weight: 1.5,
    },
    RubricCriterion {
        name: "Dissatisfaction Expression",
        description: "Clearly expresses dissatisfaction with experience",
        weight: -1.5,
    },
    RubricCriterion {
        name: "Future Purchase Intent",
        description: "Expresses intention to return/repurchase in future",
        weight: 1.5,
    },
    RubricCriterion {
        name: "Future Avoidance Intent",
        description: "Expresses intention to avoid in future",
        weight: -1.5,
    },
    RubricCriterion {
        name: "Specific Problems",
        description: "Mentions specific problems or issues",
        weight: -1.0,
    },
    RubricCriterion {
        name: "Specific Praise",
        description: "Mentions specific positive aspects or praise",
        weight: 1.0,
    },
    RubricCriterion {
        name: "Overall Tone",
        description: "The overall tone is predominantly positive",
        weight: 1.5,
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn weights_stay_within_two_points_of_zero() {
        let weights = RUBRIC.iter().map(|criterion| criterion.weight);
        let min = weights.clone().fold(f64::INFINITY, f64::min);
        let max = weights.fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, -2.0);
        assert_eq!(max, 2.0);
        assert!(RUBRIC.iter().all(|criterion| criterion.weight != 0.0));
    }

    #[test]
    fn criterion_names_are_unique() {
        let names = RUBRIC
            .iter()
            .map(|criterion| criterion.name)
            .collect::<HashSet<_>>();
        assert_eq!(names.len(), RUBRIC.len());
    }
}
