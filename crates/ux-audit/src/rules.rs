//! Checklist scoring engine.
//!
//! A fixed, ordered table of independent rules. Each rule reads the
//! [`ExtractedPage`] and yields exactly one [`Finding`] plus a non-positive
//! score delta. Deltas are summed onto [`INITIAL_SCORE`] and the total is
//! floored at zero. Findings come out in table order.
//!
//! Penalties lean on technical SEO (title, H1, content volume, HTTPS, alt
//! text, linking, viewport). Softer UX signals are advisories with a zero
//! delta, except the social card which costs 5 points. Some advisories
//! report `danger` or `warning` without deducting anything (`Lang`, `CTA`,
//! `H2`, `Paras`); that is the scoring as shipped.

use crate::types::{ExtractedPage, Finding, Status};

/// Score before any deduction.
pub const INITIAL_SCORE: i32 = 100;

/// Longest title that still counts as optimized, in characters.
pub const TITLE_MAX_CHARS: usize = 65;

/// Minimum visible word count.
pub const MIN_WORDS: usize = 300;

/// Minimum number of links.
pub const MIN_LINKS: usize = 5;

/// One row of the checklist.
pub struct Rule {
    pub category: &'static str,
    pub label: &'static str,
    /// Largest deduction the rule can apply, as a positive number.
    pub max_penalty: i32,
    check: fn(&ExtractedPage) -> Verdict,
}

impl Rule {
    /// Run the rule. Returns the (non-positive) score delta and its finding.
    pub fn apply(&self, page: &ExtractedPage) -> (i32, Finding) {
        let verdict = (self.check)(page);
        debug_assert!(verdict.delta <= 0 && -verdict.delta <= self.max_penalty);
        let finding = Finding {
            category: self.category.to_string(),
            label: self.label.to_string(),
            status: verdict.status,
            value: verdict.value,
            explanation: verdict.explanation.to_string(),
            recommendation: verdict.recommendation.to_string(),
        };
        (verdict.delta, finding)
    }
}

/// What a single check concluded.
struct Verdict {
    delta: i32,
    status: Status,
    value: String,
    explanation: &'static str,
    recommendation: &'static str,
}

impl Verdict {
    fn pass(value: impl Into<String>, explanation: &'static str) -> Self {
        Self {
            delta: 0,
            status: Status::Success,
            value: value.into(),
            explanation,
            recommendation: "",
        }
    }

    fn fail(
        delta: i32,
        status: Status,
        value: impl Into<String>,
        explanation: &'static str,
        recommendation: &'static str,
    ) -> Self {
        Self {
            delta,
            status,
            value: value.into(),
            explanation,
            recommendation,
        }
    }
}

/// Score and findings of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Bounded to `0..=100`.
    pub score: u8,
    pub findings: Vec<Finding>,
}

/// The checklist, in reporting order.
pub static RULES: [Rule; 12] = [
    Rule {
        category: "SEO",
        label: "Titre",
        max_penalty: 20,
        check: check_title,
    },
    Rule {
        category: "Structure",
        label: "H1",
        max_penalty: 20,
        check: check_h1,
    },
    Rule {
        category: "Contenu",
        label: "Mots",
        max_penalty: 15,
        check: check_word_count,
    },
    Rule {
        category: "Sécu",
        label: "HTTPS",
        max_penalty: 20,
        check: check_https,
    },
    Rule {
        category: "Accessibilité",
        label: "Alt",
        max_penalty: 10,
        check: check_image_alt,
    },
    Rule {
        category: "Nav",
        label: "Liens",
        max_penalty: 10,
        check: check_link_count,
    },
    Rule {
        category: "Tech",
        label: "Lang",
        max_penalty: 0,
        check: check_lang,
    },
    Rule {
        category: "Social",
        label: "Card",
        max_penalty: 5,
        check: check_social_card,
    },
    Rule {
        category: "Mobile",
        label: "Responsive",
        max_penalty: 20,
        check: check_viewport,
    },
    Rule {
        category: "Conversion",
        label: "CTA",
        max_penalty: 0,
        check: check_cta,
    },
    Rule {
        category: "Structure",
        label: "H2",
        max_penalty: 0,
        check: check_h2,
    },
    Rule {
        category: "Contenu",
        label: "Paras",
        max_penalty: 0,
        check: check_paragraphs,
    },
];

/// Run every rule against the page, in table order.
pub fn evaluate(page: &ExtractedPage) -> Evaluation {
    let mut score = INITIAL_SCORE;
    let mut findings = Vec::with_capacity(RULES.len());

    for rule in &RULES {
        let (delta, finding) = rule.apply(page);
        score += delta;
        findings.push(finding);
    }

    Evaluation {
        score: score.clamp(0, INITIAL_SCORE) as u8,
        findings,
    }
}

// ── Checks ──────────────────────────────────────────────────────────────────

fn check_title(page: &ExtractedPage) -> Verdict {
    match &page.title {
        None => Verdict::fail(
            -20,
            Status::Danger,
            "Manquant",
            "Critique.",
            "Ajoutez une balise <title> descriptive.",
        ),
        Some(title) => {
            let len = title.chars().count();
            if len > TITLE_MAX_CHARS {
                Verdict::fail(
                    -5,
                    Status::Warning,
                    format!("{len} car."),
                    "Trop long.",
                    "Raccourcissez (max 60 car).",
                )
            } else {
                Verdict::pass("Optimisé", "OK.")
            }
        }
    }
}

fn check_h1(page: &ExtractedPage) -> Verdict {
    match page.headings_h1.len() {
        0 => Verdict::fail(
            -20,
            Status::Danger,
            "Manquant",
            "Pas de H1.",
            "Ajoutez un titre <h1>.",
        ),
        1 => Verdict::pass("Parfait", "OK."),
        n => Verdict::fail(
            -10,
            Status::Warning,
            n.to_string(),
            "Trop de H1.",
            "Un seul H1 par page.",
        ),
    }
}

fn check_word_count(page: &ExtractedPage) -> Verdict {
    let words = page.word_count;
    if words < MIN_WORDS {
        Verdict::fail(
            -15,
            Status::Danger,
            words.to_string(),
            "Faible.",
            "Rédigez plus de contenu (>300 mots).",
        )
    } else {
        Verdict::pass(words.to_string(), "OK.")
    }
}

fn check_https(page: &ExtractedPage) -> Verdict {
    if page.has_https {
        Verdict::pass("Oui", "OK")
    } else {
        Verdict::fail(-20, Status::Danger, "Non", "Insecure", "Passez en HTTPS.")
    }
}

fn check_image_alt(page: &ExtractedPage) -> Verdict {
    // One deduction regardless of how many images lack alt text.
    match page.images_missing_alt() {
        0 => Verdict::pass("100%", "OK"),
        missing => Verdict::fail(
            -10,
            Status::Danger,
            format!("{missing} manq."),
            "Pas de desc.",
            "Ajoutez attribut alt.",
        ),
    }
}

fn check_link_count(page: &ExtractedPage) -> Verdict {
    let links = page.links_count;
    if links < MIN_LINKS {
        Verdict::fail(
            -10,
            Status::Danger,
            links.to_string(),
            "Peu de liens.",
            "Améliorez le maillage interne.",
        )
    } else {
        Verdict::pass(links.to_string(), "OK")
    }
}

fn check_lang(page: &ExtractedPage) -> Verdict {
    match &page.lang_attr {
        Some(lang) => Verdict::pass(lang.clone(), "OK"),
        None => Verdict::fail(0, Status::Danger, "N/A", "Manquante", "Déclarez la langue."),
    }
}

fn check_social_card(page: &ExtractedPage) -> Verdict {
    if page.has_og_image {
        Verdict::pass("Oui", "OK")
    } else {
        Verdict::fail(
            -5,
            Status::Warning,
            "Non",
            "Manquante",
            "Ajoutez meta og:image.",
        )
    }
}

fn check_viewport(page: &ExtractedPage) -> Verdict {
    if page.has_viewport_meta {
        Verdict::pass("Oui", "OK")
    } else {
        Verdict::fail(-20, Status::Danger, "Non", "Non", "Ajoutez meta viewport.")
    }
}

fn check_cta(page: &ExtractedPage) -> Verdict {
    match page.cta_elements_count {
        0 => Verdict::fail(0, Status::Warning, "0", "Pas de CTA", "Ajoutez des boutons."),
        n => Verdict::pass(n.to_string(), "OK"),
    }
}

fn check_h2(page: &ExtractedPage) -> Verdict {
    match page.headings_h2_count {
        0 => Verdict::fail(0, Status::Warning, "0", "Pas de H2", "Ajoutez des H2."),
        n => Verdict::pass(n.to_string(), "OK"),
    }
}

fn check_paragraphs(page: &ExtractedPage) -> Verdict {
    let paragraphs = page.paragraph_count;
    if paragraphs > 2 {
        Verdict::pass(paragraphs.to_string(), "OK")
    } else {
        Verdict::fail(0, Status::Warning, "Dense", "Compact", "Aérez le texte.")
    }
}
