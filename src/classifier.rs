use std::collections::{BTreeMap, HashMap};

/// Below this many labeled examples the classifier declines to train; a
/// model fit on a handful of records guesses worse than no guess.
pub const MIN_TRAINING_EXAMPLES: usize = 10;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to", "with",
];

/// Best-effort text categorizer: tf-idf weighted nearest-centroid over the
/// descriptions of previously categorized records. Rebuilt from scratch each
/// import run, never persisted. Every failure mode degrades to "no
/// prediction" — this layer must never block an import.
#[derive(Default)]
pub struct TextClassifier {
    idf: HashMap<String, f64>,
    // BTreeMap so equal-similarity ties resolve the same way every run.
    centroids: BTreeMap<String, HashMap<String, f64>>,
}

impl TextClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        !self.centroids.is_empty()
    }

    /// Fit from (description, category) pairs. Examples with empty text,
    /// empty labels, or no usable tokens are ignored; if fewer than
    /// MIN_TRAINING_EXAMPLES remain, the classifier stays untrained.
    pub fn train(&mut self, examples: &[(String, String)]) {
        let docs: Vec<(HashMap<String, f64>, &str)> = examples
            .iter()
            .filter(|(desc, cat)| !desc.trim().is_empty() && !cat.trim().is_empty())
            .filter_map(|(desc, cat)| {
                let counts = term_counts(desc);
                (!counts.is_empty()).then_some((counts, cat.as_str()))
            })
            .collect();

        if docs.len() < MIN_TRAINING_EXAMPLES {
            return;
        }

        let n = docs.len() as f64;
        let mut df: HashMap<&str, usize> = HashMap::new();
        for (counts, _) in &docs {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_default() += 1;
            }
        }
        let idf: HashMap<String, f64> = df
            .into_iter()
            .map(|(term, count)| {
                (term.to_string(), ((n + 1.0) / (count as f64 + 1.0)).ln() + 1.0)
            })
            .collect();

        let mut centroids: BTreeMap<String, HashMap<String, f64>> = BTreeMap::new();
        for (counts, cat) in &docs {
            let Some(vector) = weigh(counts, &idf) else {
                continue;
            };
            let centroid = centroids.entry(cat.to_string()).or_default();
            for (term, weight) in vector {
                *centroid.entry(term).or_default() += weight;
            }
        }
        for centroid in centroids.values_mut() {
            normalize(centroid);
        }
        centroids.retain(|_, c| !c.is_empty());

        if centroids.is_empty() {
            return;
        }
        self.idf = idf;
        self.centroids = centroids;
    }

    /// Predict a category, or None when untrained or when the description
    /// shares no vocabulary with any class.
    pub fn predict(&self, description: &str) -> Option<String> {
        if !self.is_trained() {
            return None;
        }
        let counts = term_counts(description);
        let vector = weigh(&counts, &self.idf)?;

        let mut best: Option<(&str, f64)> = None;
        for (category, centroid) in &self.centroids {
            let score: f64 = vector
                .iter()
                .filter_map(|(term, w)| centroid.get(term).map(|c| w * c))
                .sum();
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((category, score));
            }
        }
        best.map(|(category, _)| category.to_string())
    }
}

fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2 && !STOPWORDS.contains(w))
    {
        *counts.entry(word.to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

/// tf-idf weights for one document, l2-normalized. Terms outside the fitted
/// vocabulary are dropped. None when nothing survives.
fn weigh(counts: &HashMap<String, f64>, idf: &HashMap<String, f64>) -> Option<HashMap<String, f64>> {
    let mut vector: HashMap<String, f64> = counts
        .iter()
        .filter_map(|(term, tf)| idf.get(term).map(|w| (term.clone(), tf * w)))
        .collect();
    if vector.is_empty() {
        return None;
    }
    normalize(&mut vector);
    Some(vector)
}

fn normalize(vector: &mut HashMap<String, f64>) {
    let norm: f64 = vector.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in vector.values_mut() {
            *value /= norm;
        }
    } else {
        vector.clear();
    }
}
