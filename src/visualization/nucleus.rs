use std::cmp::Ordering;

use crate::types::{NormalizedToken, SelectionChances};

#[derive(Clone, Copy, PartialEq)]
enum Slot {
    Chosen,
    Alternative(usize),
}

/// Renormalized probability of each candidate under top-p sampling.
///
/// Candidates are the chosen token plus every alternative with a known
/// probability (an alternative repeating the chosen text is not counted
/// twice). The nucleus is the shortest descending-probability prefix whose
/// cumulative mass reaches `top_p`; with `top_p >= 1` every candidate is in
/// it. Members get `p / nucleus_mass`, non-members `0.0`, and candidates
/// with unknown probability get no chance at all.
pub fn selection_chances(token: &NormalizedToken, top_p: f64) -> SelectionChances {
    let mut candidates: Vec<(Slot, f64)> = Vec::with_capacity(token.alternatives.len() + 1);
    if let Some(p) = token.probability {
        candidates.push((Slot::Chosen, p));
    }
    for (i, alt) in token.alternatives.iter().enumerate() {
        if alt.text == token.text {
            continue;
        }
        if let Some(p) = alt.probability {
            candidates.push((Slot::Alternative(i), p));
        }
    }
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let nucleus_len = if top_p < 1.0 {
        let mut cumulative = 0.0_f64;
        let mut len = candidates.len();
        for (i, (_, p)) in candidates.iter().enumerate() {
            cumulative += p;
            if cumulative >= top_p {
                len = i + 1;
                break;
            }
        }
        len
    } else {
        candidates.len()
    };
    let nucleus_mass: f64 = candidates[..nucleus_len].iter().map(|(_, p)| p).sum();

    tracing::debug!(
        top_p,
        candidates = candidates.len(),
        nucleus = nucleus_len,
        nucleus_mass,
        "nucleus: computed selection chances"
    );

    let chance_of = |slot: Slot| -> Option<f64> {
        let position = candidates.iter().position(|(s, _)| *s == slot)?;
        let p = candidates[position].1;
        if position < nucleus_len && nucleus_mass > 0.0 {
            Some(p / nucleus_mass)
        } else {
            Some(0.0)
        }
    };

    let chosen = chance_of(Slot::Chosen);
    let alternatives = token
        .alternatives
        .iter()
        .enumerate()
        .map(|(i, alt)| {
            if alt.text == token.text {
                chosen
            } else {
                chance_of(Slot::Alternative(i))
            }
        })
        .collect();

    SelectionChances {
        chosen,
        alternatives,
    }
}
