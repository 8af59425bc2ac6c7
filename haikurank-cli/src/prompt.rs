/// Prompt building for haiku comparisons.
///
/// Both poems are shown as exactly three lines. Shorter poems are padded with
/// empty lines rather than rejected; lines past the third are dropped.

pub const JUDGE_SYSTEM: &str = "You are an expert haiku judge with deep knowledge of both \
classical Japanese haiku tradition and contemporary English-language haiku. You evaluate \
poems on their literary merit with precise, consistent criteria.";

/// Number of lines each poem is rendered with.
const POEM_LINES: usize = 3;

fn padded_lines(lines: &[String]) -> String {
    (0..POEM_LINES)
        .map(|i| lines.get(i).map(String::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt asking the judge to score poem A and poem B.
pub fn build_prompt(lines_a: &[String], lines_b: &[String]) -> String {
    format!(
        "Compare these two haiku on 6 literary dimensions. Score each dimension from 1 to 5.\n\n\
         DIMENSIONS:\n\
         1. Image Precision — Is the image specific, concrete, and sensory? (1=abstract/generic, 5=exact and irreplaceable)\n\
         2. The Cut — Is there a productive juxtaposition or turn between two elements? (1=no tension, 5=gap is the whole meaning)\n\
         3. Economy — Is every word load-bearing? (1=padded/redundant, 5=each word irreplaceable)\n\
         4. Resonance — Does the poem linger and open outward after reading? (1=closed/exhausted, 5=continues to expand)\n\
         5. Originality — Is this a fresh perception or a familiar cliché? (1=cliché, 5=genuinely new)\n\
         6. Musicality — Does it reward being read aloud? (1=clunky, 5=sound inseparable from meaning)\n\n\
         POEM A:\n{poem_a}\n\n\
         POEM B:\n{poem_b}\n\n\
         Respond with JSON only — no other text:\n\
         {{\n  \
         \"a\": {{\"image_precision\": N, \"cut\": N, \"economy\": N, \"resonance\": N, \"originality\": N, \"musicality\": N}},\n  \
         \"b\": {{\"image_precision\": N, \"cut\": N, \"economy\": N, \"resonance\": N, \"originality\": N, \"musicality\": N}},\n  \
         \"winner\": \"a\" or \"b\" or \"draw\",\n  \
         \"reasoning\": \"One sentence explaining the decisive difference.\"\n\
         }}",
        poem_a = padded_lines(lines_a),
        poem_b = padded_lines(lines_b),
    )
}
