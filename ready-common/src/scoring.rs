//! Scoring engine for completed assessments
//!
//! This module contains ONLY pure functions over two inputs: a responses map
//! and the question catalog. No database or HTTP framework dependencies, so
//! the whole calculation is testable in isolation and idempotent by
//! construction: repeated completion of an unchanged assessment produces an
//! identical report.
//!
//! # Calculation
//!
//! Per question: maximum points = 2 × impact; attained points = 2 × impact
//! for "yes", 1 × impact for "partial", 0 for "no" or unanswered. A category's
//! raw percentage is attained / maximum × 100 (0 when it has no questions),
//! its weighted contribution is raw × weight, and the overall score is the
//! weight-normalized sum, rounded to one decimal. Every non-"yes" question
//! becomes a recommendation candidate ranked by weight × impact × answer
//! penalty, stably sorted and truncated to the top 10.

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recommendation list cap
pub const MAX_RECOMMENDATIONS: usize = 10;

/// A single answer to a catalog question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    Partial,
    No,
}

/// One recorded response: the answer plus free-form assessor notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub answer: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Responses keyed by category id, then question id
pub type ResponseMap = BTreeMap<String, BTreeMap<String, QuestionResponse>>;

/// Three-tier label for a category's raw percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Strong,
    Adequate,
    Weak,
}

impl CategoryStatus {
    fn for_raw(raw_pct: f64) -> Self {
        if raw_pct >= 75.0 {
            CategoryStatus::Strong
        } else if raw_pct >= 50.0 {
            CategoryStatus::Adequate
        } else {
            CategoryStatus::Weak
        }
    }
}

/// Coarse readiness label derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Promising,
    NeedsWork,
}

impl Readiness {
    fn for_score(overall: f64) -> Self {
        if overall >= 75.0 {
            Readiness::Ready
        } else if overall >= 50.0 {
            Readiness::Promising
        } else {
            Readiness::NeedsWork
        }
    }
}

/// Per-category score breakdown entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    /// Unweighted attainment percentage, one decimal
    pub raw_score: f64,
    /// raw_score × category weight, two decimals
    pub weighted_score: f64,
    pub status: CategoryStatus,
}

/// One prioritized improvement recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub question: String,
    pub current_answer: Answer,
    pub guidance: String,
    pub impact: f64,
    pub priority_score: f64,
}

/// Full scoring result for a completed assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub overall_score: f64,
    pub category_scores: BTreeMap<String, CategoryScore>,
    pub recommendations: Vec<Recommendation>,
    pub readiness: Readiness,
}

/// Score an assessment's responses against the catalog.
///
/// Missing answers count as "no". Deterministic: the same inputs always
/// produce the same report.
pub fn score_assessment(catalog: &Catalog, responses: &ResponseMap) -> ScoreReport {
    let mut category_scores = BTreeMap::new();
    let mut total_weighted = 0.0;
    let mut total_weight = 0.0;

    for category in &catalog.categories {
        let answered = responses.get(&category.id);

        let mut max_points = 0.0;
        let mut attained = 0.0;
        for question in &category.questions {
            let impact = question.impact();
            max_points += 2.0 * impact;
            match answer_for(answered, &question.id) {
                Answer::Yes => attained += 2.0 * impact,
                Answer::Partial => attained += impact,
                Answer::No => {}
            }
        }

        // A category with no questions (or all-zero impact) contributes 0
        // rather than dividing by zero.
        let raw_pct = if max_points > 0.0 {
            attained / max_points * 100.0
        } else {
            0.0
        };
        let weighted = raw_pct * category.weight;
        total_weighted += weighted;
        total_weight += category.weight;

        category_scores.insert(
            category.id.clone(),
            CategoryScore {
                name: category.name.clone(),
                raw_score: round1(raw_pct),
                weighted_score: round2(weighted),
                status: CategoryStatus::for_raw(raw_pct),
            },
        );
    }

    let overall_score = if total_weight > 0.0 {
        round1(total_weighted / total_weight)
    } else {
        0.0
    };

    ScoreReport {
        overall_score,
        category_scores,
        recommendations: build_recommendations(catalog, responses),
        readiness: Readiness::for_score(overall_score),
    }
}

/// Candidate recommendations for every non-"yes" question, ranked by
/// priority score descending. The sort is stable, so ties keep catalog
/// encounter order (category order, then question order).
fn build_recommendations(catalog: &Catalog, responses: &ResponseMap) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for category in &catalog.categories {
        let answered = responses.get(&category.id);
        for question in &category.questions {
            let answer = answer_for(answered, &question.id);
            if answer == Answer::Yes {
                continue;
            }
            let impact = question.impact();
            let penalty = if answer == Answer::No { 2.0 } else { 1.0 };
            recommendations.push(Recommendation {
                category: category.name.clone(),
                question: question.text.clone(),
                current_answer: answer,
                guidance: question.guidance.clone().unwrap_or_default(),
                impact,
                priority_score: category.weight * impact * penalty,
            });
        }
    }

    recommendations.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

fn answer_for(answered: Option<&BTreeMap<String, QuestionResponse>>, question_id: &str) -> Answer {
    answered
        .and_then(|m| m.get(question_id))
        .map(|r| r.answer)
        .unwrap_or(Answer::No)
}

/// Merge newly submitted responses into an existing map at the
/// (category, question) leaf: submitted leaves overwrite same-keyed leaves,
/// untouched leaves are preserved. Nothing is ever deleted.
pub fn merge_responses(existing: &mut ResponseMap, incoming: ResponseMap) {
    for (category_id, questions) in incoming {
        let slot = existing.entry(category_id).or_default();
        for (question_id, response) in questions {
            slot.insert(question_id, response);
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Question};

    fn question(id: &str, impact: Option<f64>) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {}?", id),
            impact,
            guidance: Some(format!("Guidance for {}", id)),
        }
    }

    fn category(id: &str, weight: f64, questions: Vec<Question>) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Category {}", id),
            weight,
            questions,
        }
    }

    fn catalog(categories: Vec<Category>) -> Catalog {
        Catalog {
            categories,
            scoring: Default::default(),
        }
    }

    fn respond(entries: &[(&str, &str, Answer)]) -> ResponseMap {
        let mut map = ResponseMap::new();
        for (cat, q, answer) in entries {
            map.entry(cat.to_string()).or_default().insert(
                q.to_string(),
                QuestionResponse {
                    answer: *answer,
                    notes: None,
                },
            );
        }
        map
    }

    #[test]
    fn worked_example_yes_plus_partial_is_75() {
        // One category (weight 1.0), two questions (impact 1.0 each);
        // yes + partial => (2+1)/4 * 100 = 75.0
        let cat = catalog(vec![category(
            "1",
            1.0,
            vec![question("1.1", None), question("1.2", None)],
        )]);
        let responses = respond(&[("1", "1.1", Answer::Yes), ("1", "1.2", Answer::Partial)]);

        let report = score_assessment(&cat, &responses);

        assert_eq!(report.overall_score, 75.0);
        assert_eq!(report.readiness, Readiness::Ready);
        let score = &report.category_scores["1"];
        assert_eq!(score.raw_score, 75.0);
        assert_eq!(score.status, CategoryStatus::Strong);
    }

    #[test]
    fn all_yes_scores_100() {
        let cat = catalog(vec![
            category("1", 1.5, vec![question("1.1", Some(2.0)), question("1.2", None)]),
            category("2", 0.5, vec![question("2.1", Some(0.5))]),
        ]);
        let responses = respond(&[
            ("1", "1.1", Answer::Yes),
            ("1", "1.2", Answer::Yes),
            ("2", "2.1", Answer::Yes),
        ]);

        let report = score_assessment(&cat, &responses);

        assert_eq!(report.overall_score, 100.0);
        assert_eq!(report.readiness, Readiness::Ready);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn all_unanswered_scores_zero_and_recommends_everything() {
        let cat = catalog(vec![
            category("1", 1.0, vec![question("1.1", None), question("1.2", None)]),
            category("2", 2.0, vec![question("2.1", None)]),
        ]);

        let report = score_assessment(&cat, &ResponseMap::new());

        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.readiness, Readiness::NeedsWork);
        // Every question appears as a "no" candidate
        assert_eq!(report.recommendations.len(), 3);
        for rec in &report.recommendations {
            assert_eq!(rec.current_answer, Answer::No);
        }
    }

    #[test]
    fn scores_stay_in_bounds() {
        let cat = catalog(vec![
            category("1", 3.0, vec![question("1.1", Some(2.0)), question("1.2", None)]),
            category("2", 0.25, vec![question("2.1", None), question("2.2", Some(1.5))]),
        ]);
        let answer_sets = [
            ResponseMap::new(),
            respond(&[("1", "1.1", Answer::Partial)]),
            respond(&[("1", "1.1", Answer::Yes), ("2", "2.2", Answer::Partial)]),
            respond(&[
                ("1", "1.1", Answer::Yes),
                ("1", "1.2", Answer::Yes),
                ("2", "2.1", Answer::Yes),
                ("2", "2.2", Answer::Yes),
            ]),
        ];

        for responses in answer_sets {
            let report = score_assessment(&cat, &responses);
            assert!((0.0..=100.0).contains(&report.overall_score));
            for score in report.category_scores.values() {
                assert!((0.0..=100.0).contains(&score.raw_score));
            }
        }
    }

    #[test]
    fn empty_category_contributes_zero_without_error() {
        let cat = catalog(vec![
            category("1", 1.0, vec![]),
            category("2", 1.0, vec![question("2.1", None)]),
        ]);
        let responses = respond(&[("2", "2.1", Answer::Yes)]);

        let report = score_assessment(&cat, &responses);

        assert_eq!(report.category_scores["1"].raw_score, 0.0);
        assert_eq!(report.category_scores["1"].status, CategoryStatus::Weak);
        // (0 * 1.0 + 100 * 1.0) / 2.0
        assert_eq!(report.overall_score, 50.0);
        assert_eq!(report.readiness, Readiness::Promising);
    }

    #[test]
    fn zero_total_weight_scores_zero() {
        let cat = catalog(vec![category("1", 0.0, vec![question("1.1", None)])]);
        let report = score_assessment(&cat, &respond(&[("1", "1.1", Answer::Yes)]));
        assert_eq!(report.overall_score, 0.0);
    }

    #[test]
    fn unanswered_question_counts_as_no() {
        let cat = catalog(vec![category(
            "1",
            1.0,
            vec![question("1.1", None), question("1.2", None)],
        )]);
        // Only 1.1 answered; 1.2 is implicit "no": 2/4 = 50%
        let report = score_assessment(&cat, &respond(&[("1", "1.1", Answer::Yes)]));

        assert_eq!(report.overall_score, 50.0);
        assert_eq!(report.category_scores["1"].status, CategoryStatus::Adequate);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].current_answer, Answer::No);
    }

    #[test]
    fn recommendations_ranked_by_priority_descending() {
        // no beats partial at equal weight/impact, and weight/impact scale priority
        let cat = catalog(vec![
            category("1", 1.0, vec![question("1.1", Some(1.0)), question("1.2", Some(3.0))]),
            category("2", 2.0, vec![question("2.1", Some(1.0))]),
        ]);
        let responses = respond(&[
            ("1", "1.1", Answer::Partial), // 1.0 * 1.0 * 1 = 1.0
            ("1", "1.2", Answer::No),      // 1.0 * 3.0 * 2 = 6.0
            ("2", "2.1", Answer::No),      // 2.0 * 1.0 * 2 = 4.0
        ]);

        let report = score_assessment(&cat, &responses);

        let priorities: Vec<f64> = report
            .recommendations
            .iter()
            .map(|r| r.priority_score)
            .collect();
        assert_eq!(priorities, vec![6.0, 4.0, 1.0]);
    }

    #[test]
    fn recommendation_ties_keep_catalog_order() {
        // Three identical-priority candidates must come out in category order,
        // then question order.
        let cat = catalog(vec![
            category("1", 1.0, vec![question("1.1", None), question("1.2", None)]),
            category("2", 1.0, vec![question("2.1", None)]),
        ]);

        let report = score_assessment(&cat, &ResponseMap::new());

        let questions: Vec<&str> = report
            .recommendations
            .iter()
            .map(|r| r.question.as_str())
            .collect();
        assert_eq!(
            questions,
            vec!["Question 1.1?", "Question 1.2?", "Question 2.1?"]
        );
    }

    #[test]
    fn recommendations_truncate_to_ten() {
        let questions: Vec<Question> =
            (1..=15).map(|i| question(&format!("1.{}", i), None)).collect();
        let cat = catalog(vec![category("1", 1.0, questions)]);

        let report = score_assessment(&cat, &ResponseMap::new());

        assert_eq!(report.recommendations.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn scoring_is_idempotent() {
        let cat = catalog(vec![
            category("1", 1.5, vec![question("1.1", Some(2.0)), question("1.2", None)]),
            category("2", 0.75, vec![question("2.1", None)]),
        ]);
        let responses = respond(&[
            ("1", "1.1", Answer::Partial),
            ("2", "2.1", Answer::Yes),
        ]);

        let first = score_assessment(&cat, &responses);
        let second = score_assessment(&cat, &responses);

        assert_eq!(first, second);
    }

    #[test]
    fn overall_score_rounds_to_one_decimal() {
        // Single question partial with impact 1.5: 1.5/3.0 = 50%,
        // two categories weighted 1.0 and 2.0: (50*1 + 0*2)/3 = 16.666...
        let cat = catalog(vec![
            category("1", 1.0, vec![question("1.1", Some(1.5))]),
            category("2", 2.0, vec![question("2.1", None)]),
        ]);
        let report = score_assessment(&cat, &respond(&[("1", "1.1", Answer::Partial)]));
        assert_eq!(report.overall_score, 16.7);
    }

    #[test]
    fn merge_overwrites_leaves_and_preserves_siblings() {
        let mut existing = respond(&[
            ("1", "1.1", Answer::No),
            ("1", "1.2", Answer::Yes),
            ("2", "2.1", Answer::Partial),
        ]);

        let incoming = respond(&[("1", "1.1", Answer::Yes), ("3", "3.1", Answer::Partial)]);
        merge_responses(&mut existing, incoming);

        // Overwritten leaf
        assert_eq!(existing["1"]["1.1"].answer, Answer::Yes);
        // Sibling leaf in the same category untouched
        assert_eq!(existing["1"]["1.2"].answer, Answer::Yes);
        // Unrelated category untouched
        assert_eq!(existing["2"]["2.1"].answer, Answer::Partial);
        // New category added
        assert_eq!(existing["3"]["3.1"].answer, Answer::Partial);
    }

    #[test]
    fn merge_never_deletes() {
        let mut existing = respond(&[("1", "1.1", Answer::Yes), ("1", "1.2", Answer::Yes)]);
        merge_responses(&mut existing, respond(&[("1", "1.1", Answer::No)]));
        assert_eq!(existing["1"].len(), 2);
    }

    #[test]
    fn answer_serialization_is_lowercase() {
        assert_eq!(serde_json::to_string(&Answer::Yes).unwrap(), r#""yes""#);
        assert_eq!(serde_json::to_string(&Answer::Partial).unwrap(), r#""partial""#);
        assert_eq!(
            serde_json::to_string(&Readiness::NeedsWork).unwrap(),
            r#""needs_work""#
        );
        assert_eq!(
            serde_json::to_string(&CategoryStatus::Strong).unwrap(),
            r#""strong""#
        );
    }
}
