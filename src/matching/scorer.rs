//! Profile/job compatibility. Skills weigh 70%, experience level 20% and
//! location 10%.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::jobs::repo_types::Job;
use crate::profile::repo_types::Profile;

const SKILL_WEIGHT: f64 = 0.7;
const EXPERIENCE_POINTS: u32 = 20;
const LOCATION_POINTS: u32 = 10;

/// The seeker side of a comparison.
#[derive(Debug, Clone, Copy)]
pub struct Seeker<'a> {
    pub skills: &'a [String],
    pub experience: &'a str,
    pub location: &'a str,
}

impl<'a> From<&'a Profile> for Seeker<'a> {
    fn from(p: &'a Profile) -> Self {
        Self {
            skills: &p.skills,
            experience: p.experience.as_deref().unwrap_or_default(),
            location: &p.location,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Opening<'a> {
    pub skills: &'a [String],
    pub experience_level: &'a str,
    pub location: &'a str,
}

impl<'a> From<&'a Job> for Opening<'a> {
    fn from(j: &'a Job) -> Self {
        Self {
            skills: &j.skills,
            experience_level: j.experience_level.map(|l| l.as_str()).unwrap_or_default(),
            location: &j.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub skill_score: f64,
    pub experience_score: u32,
    pub location_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(rename = "match_score")]
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_job_skills: usize,
    pub matched_count: usize,
    pub experience_match: bool,
    pub location_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
}

impl MatchResult {
    fn flat(score: f64, reason: &'static str) -> Self {
        Self {
            score,
            reason: Some(reason),
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            total_job_skills: 0,
            matched_count: 0,
            experience_match: false,
            location_match: false,
            breakdown: None,
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn score(seeker: Option<Seeker<'_>>, opening: Opening<'_>) -> MatchResult {
    let Some(seeker) = seeker else {
        return MatchResult::flat(0.0, "No profile found. Please complete your profile.");
    };
    let job_skills: BTreeSet<&str> = opening.skills.iter().map(String::as_str).collect();
    if job_skills.is_empty() {
        return MatchResult::flat(50.0, "No skills specified for this job");
    }
    let own_skills: BTreeSet<&str> = seeker.skills.iter().map(String::as_str).collect();

    let matched: Vec<String> = job_skills
        .intersection(&own_skills)
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<String> = job_skills
        .difference(&own_skills)
        .map(|s| s.to_string())
        .collect();
    let skill_pct = matched.len() as f64 / job_skills.len() as f64 * 100.0;

    let experience = seeker.experience.to_lowercase();
    let level = opening.experience_level.to_lowercase();
    let experience_score = if !experience.is_empty() && !level.is_empty() && experience == level {
        EXPERIENCE_POINTS
    } else {
        0
    };

    let here = seeker.location.to_lowercase();
    let there = opening.location.to_lowercase();
    let location_score = if !here.is_empty() && !there.is_empty() && there.contains(&here) {
        LOCATION_POINTS
    } else {
        0
    };

    let total = (skill_pct * SKILL_WEIGHT + f64::from(experience_score) + f64::from(location_score))
        .min(100.0);

    MatchResult {
        score: round1(total),
        reason: None,
        matched_count: matched.len(),
        total_job_skills: job_skills.len(),
        matched_skills: matched,
        missing_skills: missing,
        experience_match: experience_score > 0,
        location_match: location_score > 0,
        breakdown: Some(Breakdown {
            skill_score: round1(skill_pct * SKILL_WEIGHT),
            experience_score,
            location_score,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partial_skill_overlap() {
        let own = skills(&["python", "sql"]);
        let wanted = skills(&["python", "react", "sql"]);
        let result = score(
            Some(Seeker { skills: &own, experience: "", location: "" }),
            Opening { skills: &wanted, experience_level: "", location: "Remote" },
        );
        assert_eq!(result.score, 46.7);
        assert_eq!(result.matched_skills, vec!["python", "sql"]);
        assert_eq!(result.missing_skills, vec!["react"]);
        assert_eq!(result.matched_count, 2);
        assert_eq!(result.total_job_skills, 3);
        assert!(!result.experience_match);
    }

    #[test]
    fn job_without_skills_is_neutral() {
        let own = skills(&["python"]);
        let result = score(
            Some(Seeker { skills: &own, experience: "senior", location: "berlin" }),
            Opening { skills: &[], experience_level: "senior", location: "Berlin" },
        );
        assert_eq!(result.score, 50.0);
        assert_eq!(result.reason, Some("No skills specified for this job"));
        assert!(result.breakdown.is_none());
    }

    #[test]
    fn missing_profile_scores_zero() {
        let wanted = skills(&["python"]);
        let result = score(
            None,
            Opening { skills: &wanted, experience_level: "", location: "" },
        );
        assert_eq!(result.score, 0.0);
        assert!(result.matched_skills.is_empty());
    }

    #[test]
    fn full_match_caps_at_hundred() {
        let own = skills(&["rust", "sql"]);
        let result = score(
            Some(Seeker { skills: &own, experience: "Senior", location: "berlin" }),
            Opening { skills: &own, experience_level: "senior", location: "Berlin, Germany" },
        );
        assert_eq!(result.score, 100.0);
        let breakdown = result.breakdown.unwrap();
        assert_eq!(breakdown.skill_score, 70.0);
        assert_eq!(breakdown.experience_score, 20);
        assert_eq!(breakdown.location_score, 10);
    }

    #[test]
    fn skills_compare_case_sensitively() {
        let own = skills(&["Python"]);
        let wanted = skills(&["python"]);
        let result = score(
            Some(Seeker { skills: &own, experience: "", location: "" }),
            Opening { skills: &wanted, experience_level: "", location: "" },
        );
        assert_eq!(result.score, 0.0);
        assert_eq!(result.missing_skills, vec!["python"]);
    }
}
