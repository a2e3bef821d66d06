use edupeak_core::message::ImageRef;

/// File-name keywords → description. First match wins.
const IMAGE_RULES: &[(&[&str], &str)] = &[
    (
        &["graph", "chart"],
        "The image shows a line graph depicting an upward trend in supply and demand equilibrium over time.",
    ),
    (
        &["code", "snippet"],
        "The image contains a code snippet in Python defining a recursive function for calculating Fibonacci numbers.",
    ),
    (
        &["diagram", "architecture"],
        "The image illustrates a system architecture diagram with a client-server model, including a load balancer and database cluster.",
    ),
    (
        &["math", "equation"],
        "The image displays a quadratic equation: ax^2 + bx + c = 0, along with the quadratic formula for solving it.",
    ),
];

const DEFAULT_DESCRIPTION: &str = "The image appears to be a visual reference related to the study topic. \
     It contains text and graphical elements.";

/// Stand-in for a vision model: picks a description from the file name.
pub fn describe_image(image: &ImageRef) -> &'static str {
    let name = image.file_name.to_lowercase();
    IMAGE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, description)| *description)
        .unwrap_or(DEFAULT_DESCRIPTION)
}
