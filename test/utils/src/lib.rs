/// Participants payload as returned by `GET /api/get_participants/2020`.
/// Sources are ordered by the service's message counts, most active first.
pub fn participants_fixture() -> &'static str {
    return r#"
{
    "year": 2020,
    "participants_by_source": {
        "whatsapp": ["Alex", "Sam", "Jordan"],
        "discord": ["alex#0001", "samwise"],
        "instagram": []
    }
}
"#
    .trim();
}

/// Payload returned by `POST /api/process_data` after a partially successful
/// run.
pub fn processing_fixture() -> &'static str {
    return r#"
{
    "message": "Data processing complete.",
    "available_years": [2018, 2019, 2021],
    "unprocessed_files": ["notes.pdf", "broken.zip"]
}
"#
    .trim();
}

/// Payload returned by `GET /api/get_processed_files`.
pub fn processed_files_fixture() -> &'static str {
    return r#"
{
    "discord": ["Discord DM (samwise)"],
    "whatsapp": ["WhatsApp Chat with Jordan", "WhatsApp Chat with Sam"]
}
"#
    .trim();
}

pub fn markup_fixture() -> &'static str {
    return "Honestly **2020** was *a lot*, but we made it.";
}
