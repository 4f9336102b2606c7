//! Phrase variations for training examples.

/// Generates variations of a training input.
///
/// The first element is always `input` itself. Greeting, order status and
/// shipping inputs get four extra phrasings each; other intents get none.
///
/// # Examples
///
/// ```
/// use supportbot::dataset::generate_variations;
///
/// let v = generate_variations("Hello", "greeting");
/// assert_eq!(v[0], "Hello");
/// assert!(v.contains(&"Hey hello".to_string()));
/// ```
#[must_use]
pub fn generate_variations(input: &str, intent: &str) -> Vec<String> {
    let mut variations = vec![input.to_string()];
    let lower = input.to_lowercase();

    match intent {
        "greeting" => variations.extend([
            format!("{input} there"),
            format!("{input}!"),
            format!("Hey {lower}"),
            format!("Good morning {lower}"),
        ]),
        "order_status" => variations.extend([
            format!("Where is {input}"),
            format!("Status of {input}"),
            format!("Track {input}"),
            format!("Check {input}"),
        ]),
        "shipping" => variations.extend([
            format!("How long for {input}"),
            format!("When will {input} arrive"),
            format!("Delivery time for {input}"),
            format!("Shipping duration for {input}"),
        ]),
        _ => {}
    }

    variations
}
