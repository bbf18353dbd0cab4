use std::fmt::Write;

use crate::classifier::CandidateSummary;

/// Build the structured prompt enumerating candidates for the
/// classifier. Tier policy lives here: exceptional is rare (0-2 per
/// run) and the reply should surface 2-3 deals whenever any candidates
/// exist, because silence erodes trust more than an okay deal.
pub fn build_prompt(locale: &str, candidates: &[CandidateSummary]) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You curate flight deals departing {}. Assign each worthwhile candidate a tier \
         (exceptional, good, notable) and a short human-readable description of at least \
         10 characters. Reply with JSON: {{\"selections\": [{{\"index\", \"tier\", \
         \"description\"}}], \"reasoning\"}}.",
        locale
    );
    let _ = writeln!(
        prompt,
        "Tier exceptional is rare: 0-2 per run, reserved for fares a subscriber should \
         book the same day. Prefer surfacing 2-3 deals over surfacing none."
    );
    let _ = writeln!(prompt, "\nCandidates:");

    for c in candidates {
        let discount = c
            .discount_pct
            .map(|d| format!("{:.0}% below typical", d))
            .unwrap_or_else(|| "no reference price".to_string());
        let _ = writeln!(
            prompt,
            "[{}] {} — ${:.0} {} ({}), {} to {} ({} days), {}, {}, pre-score {}",
            c.index,
            c.route,
            c.price,
            c.currency,
            discount,
            c.departure_date,
            c.return_date,
            c.trip_length_days,
            stops_phrase(c.stops),
            c.airline,
            c.pre_score
        );
    }

    prompt
}

pub fn stops_phrase(stops: u32) -> String {
    match stops {
        0 => "nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}
