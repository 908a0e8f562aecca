use rand::seq::IndexedRandom;
use rand::Rng;

const TEMPLATES: [&str; 5] = [
    "A Study of {keywords} in {main_topic}",
    "Exploring {keywords} in {main_topic}",
    "An Analysis of {keywords} in {main_topic}",
    "{keywords}: A New Perspective on {main_topic}",
    "{main_topic} and the Role of {keywords}",
];

/// Rephrase `title` with a randomly picked template.
///
/// The last word is the main topic, the words before it are the keywords.
/// Returns `None` for a title with no words.
pub fn suggest_better_title<R: Rng + ?Sized>(title: &str, rng: &mut R) -> Option<String> {
    let words: Vec<&str> = title.split_whitespace().collect();
    let (main_topic, keywords) = words.split_last()?;
    let template = TEMPLATES.choose(rng)?;

    Some(render(template, &keywords.join(" "), main_topic))
}

fn render(template: &str, keywords: &str, main_topic: &str) -> String {
    template
        .replace("{keywords}", keywords)
        .replace("{main_topic}", main_topic)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
