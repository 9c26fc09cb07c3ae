//! The built-in pattern catalog.
//!
//! Entries live as a plain `&'static [(...)]` table compiled into the binary
//! (the teacher ships its FSRS weight table the same way) and are converted to
//! `PatternSpec`s lazily by `default_catalog()`. Negative weights mark noise
//! categories (greetings, fillers, small talk); positive weights mark content
//! worth retaining. `severity_amplifiable` is the only modifier tag consulted
//! by the scorer today (§4.2); other tags are reserved for future modifiers.

use super::PatternSpec;

type RawEntry = (&'static str, &'static str, i32, &'static str, &'static [&'static str]);

const RAW: &[RawEntry] = &[
    // ---- medical / health (high positive weight, mostly severity-amplifiable) ----
    ("medical_allergy", r"\ballerg(y|ies|ic)\b", 14, "medical", &["severity_amplifiable"]),
    ("medical_epipen", r"\bepi\s?pen\b", 10, "medical", &["severity_amplifiable"]),
    ("medical_condition_diagnosis", r"\b(diagnosed with|i have|suffer from)\b.{0,30}\b(asthma|diabetes|epilepsy|cancer|hypertension)\b", 13, "medical", &["severity_amplifiable"]),
    ("medical_medication", r"\b(medication|prescription|dosage|insulin|inhaler)\b", 9, "medical", &["severity_amplifiable"]),
    ("medical_symptom", r"\b(chest pain|shortness of breath|can't breathe|seizure|bleeding)\b", 12, "medical", &["severity_amplifiable"]),
    ("medical_appointment", r"\b(doctor'?s? appointment|surgery|hospital|er visit)\b", 7, "medical", &[]),

    // ---- safety / emergency ----
    ("safety_emergency_contact", r"\bemergency contact\b", 11, "safety", &["severity_amplifiable"]),
    ("safety_danger", r"\b(in danger|unsafe|not safe|threat(en|ened)?)\b", 10, "safety", &["severity_amplifiable"]),
    ("safety_fire_evacuation", r"\b(fire escape|evacuation plan|smoke detector)\b", 6, "safety", &[]),

    // ---- identity / relationship ----
    ("identity_name", r"\bmy name is\b", 9, "identity", &[]),
    ("identity_relationship_family", r"\bmy (daughter|son|wife|husband|mother|father|sister|brother|partner)\b", 8, "identity", &[]),
    ("identity_birthday", r"\bmy birthday is\b", 6, "identity", &[]),
    ("identity_job", r"\bi work as\b|\bi'?m a\b.{0,20}\b(engineer|doctor|teacher|nurse|lawyer)\b", 5, "identity", &[]),
    ("identity_address", r"\bi live (at|in|on)\b", 6, "identity", &[]),

    // ---- preference / fact (contradiction-bearing categories) ----
    ("preference_like", r"\bi (love|like|enjoy)\b", 4, "preference", &[]),
    ("preference_dislike", r"\bi (hate|dislike|can'?t stand)\b", 4, "preference", &[]),
    ("preference_diet", r"\bi'?m (vegetarian|vegan|gluten[- ]free|lactose intolerant)\b", 6, "preference", &[]),
    ("fact_statement", r"\bthe fact is\b|\bit'?s true that\b", 3, "fact", &[]),
    ("fact_cant_eat", r"\bcan'?t eat\b|\bcannot eat\b|\bwon'?t eat\b", 5, "preference", &[]),

    // ---- plans / events ----
    ("event_upcoming", r"\b(next week|next month|on (monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b", 4, "event", &[]),
    ("event_deadline", r"\bdeadline\b|\bdue (by|on)\b", 5, "event", &["severity_amplifiable"]),
    ("event_travel", r"\b(flight|flying|trip to|traveling to)\b", 3, "event", &[]),

    // ---- emotion (some positive, used to gate L2) ----
    ("emotion_fear", r"\b(terrifies?|terrified|scared|panick?ing?)\b", 6, "emotion", &["severity_amplifiable"]),
    ("emotion_grief", r"\b(devastated|heartbroken|grieving)\b", 7, "emotion", &["severity_amplifiable"]),
    ("emotion_joy", r"\b(thrilled|ecstatic|overjoyed)\b", 3, "emotion", &[]),

    // ---- noise: greetings, fillers, small talk (negative weight) ----
    ("greeting_hello", r"\b(hello|hi there|hey)\b", -4, "filler", &[]),
    ("greeting_howareyou", r"\bhow are you\b", -3, "filler", &[]),
    ("filler_um", r"\b(um+|uh+|like i said)\b", -2, "filler", &[]),
    ("filler_ok_thanks", r"\b(ok(ay)?,? thanks|sounds good|no worries)\b", -3, "filler", &[]),
    ("filler_smalltalk_weather", r"\bnice weather\b|\bweather (today|outside)\b", -3, "filler", &[]),
    ("filler_smalltalk_weekend", r"\bhow was your weekend\b", -3, "filler", &[]),
    ("filler_goodbye", r"\b(goodbye|bye for now|talk (later|soon))\b", -3, "filler", &[]),
    ("filler_acknowledgment", r"\b(got it|makes sense|i see|understood)\b", -2, "filler", &[]),

    // ---- misc content worth a small positive bump ----
    ("content_question", r"\w.*\?\s*$", 1, "conversational", &[]),
    ("content_opinion", r"\bi think\b|\bin my opinion\b", 2, "conversational", &[]),
    ("content_request", r"\bcan you (help|remind|tell)\b", 2, "conversational", &[]),
    ("content_financial", r"\b(salary|mortgage|rent|loan|debt)\b", 5, "financial", &[]),
    ("content_legal", r"\b(lawsuit|contract|custody|divorce)\b", 6, "legal", &["severity_amplifiable"]),
    ("content_education", r"\b(started kindergarten|enrolled in|graduat(ed|ing))\b", 4, "event", &[]),
    ("content_pet", r"\bmy (dog|cat|pet)\b", 3, "identity", &[]),
    ("content_location_move", r"\b(moving to|relocating to|moved to)\b", 4, "event", &[]),
    ("content_work_project", r"\b(project deadline|client meeting|performance review)\b", 4, "event", &[]),
    ("content_allergy_reaction", r"\b(anaphyla(xis|ctic)|hives|swelling (up|throat))\b", 12, "medical", &["severity_amplifiable"]),
    ("content_password_secret", r"\bmy password is\b|\bpin (number|code) is\b", -6, "security", &[]),
    ("filler_sports_chat", r"\b(watch the game|who'?s winning)\b", -3, "filler", &[]),
    ("filler_compliment", r"\bnice (job|work)\b|\bwell done\b", -1, "filler", &[]),
];

/// Build the declarative `PatternSpec` table the registry compiles from.
pub fn default_catalog() -> Vec<PatternSpec> {
    RAW.iter()
        .map(|(name, regex, weight, category, tags)| PatternSpec {
            name: (*name).to_string(),
            regex: (*regex).to_string(),
            weight: *weight,
            category: (*category).to_string(),
            modifier_tags: tags.iter().map(|t| (*t).to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_table_has_unique_names() {
        let mut names: Vec<&str> = RAW.iter().map(|(n, ..)| *n).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn raw_table_has_at_least_forty_entries() {
        assert!(RAW.len() >= 40);
    }
}
