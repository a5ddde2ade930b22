//! Keyword responder for the study assistant
//!
//! Replies are picked from two ordered keyword tables. Declaration order is
//! the match priority, so the tables are slices rather than maps.

/// Ordered `(keyword, reply)` pairs. The empty keyword never matches.
pub type ResponseTable = &'static [(&'static str, &'static str)];

/// Replies used once the conversation is about mathematics.
pub const MATH_RESPONSES: ResponseTable = &[
    (
        "fraction",
        "Fractions represent parts of a whole. For example, in the fraction 3/4, the numerator (3) represents how many parts we're talking about, while the denominator (4) represents how many equal parts the whole is divided into. Would you like to learn about adding, subtracting, multiplying, or dividing fractions?",
    ),
    (
        "algebra",
        "Algebra uses symbols (like x and y) to represent numbers and express mathematical relationships. For example, if we know that x + 5 = 10, we can solve for x by subtracting 5 from both sides: x = 5. What specific algebraic concept would you like help with?",
    ),
    (
        "geometry",
        "Geometry is the study of shapes, sizes, and properties of space. Key concepts include points, lines, angles, and various 2D and 3D shapes. Would you like to learn about calculating areas, perimeters, or perhaps the Pythagorean theorem?",
    ),
    (
        "calculus",
        "Calculus deals with rates of change and accumulation. The two main branches are differential calculus (concerning rates of change and slopes) and integral calculus (concerning accumulation and areas). What specific calculus topic are you interested in?",
    ),
    (
        "equation",
        "Equations show that two mathematical expressions are equal. To solve them, we need to isolate the variable (like x) on one side. Would you like help solving a specific type of equation?",
    ),
    (
        "pythagorean",
        "The Pythagorean theorem states that in a right triangle, the square of the length of the hypotenuse equals the sum of squares of the other two sides. So if a and b are the legs and c is the hypotenuse: a² + b² = c². This is useful for finding unknown sides of right triangles.",
    ),
    (
        "multiplication",
        "Multiplication is a mathematical operation that gives the result of combining groups of equal size. For example, 5 × 3 means 5 groups of 3, which equals 15. Would you like help with multiplication tables or specific multiplication problems?",
    ),
    (
        "division",
        "Division is the process of sharing or grouping a number into equal parts. For example, 15 ÷ 3 = 5 means 15 can be divided into 3 equal groups, with 5 in each group. Do you need help with long division or dividing fractions?",
    ),
    (
        "percentage",
        "A percentage is a number expressed as a fraction of 100. For example, 25% is 25/100 or 0.25. To calculate a percentage of a number, multiply the number by the percentage expressed as a decimal. For example, 25% of 80 is 0.25 × 80 = 20.",
    ),
    (
        "hello",
        "Hello! I'm your Math AI tutor. What mathematics topic would you like help with today?",
    ),
    (
        "hi",
        "Hi there! I'm ready to help with math problems. What would you like to learn about?",
    ),
    (
        "help",
        "I'm here to help with mathematics! I can explain concepts, walk through problem-solving steps, provide examples, or answer specific questions. What math topic are you studying?",
    ),
    (
        "",
        "I didn't catch your math question. Could you please rephrase it?",
    ),
];

/// Replies for everything that is not (yet) about mathematics.
pub const GENERAL_RESPONSES: ResponseTable = &[
    ("hello", "Hello! How can I help with your learning today?"),
    ("hi", "Hi there! Do you have questions about your coursework?"),
    (
        "help",
        "I'm here to help! You can ask me questions about math, science, language arts, or social studies.",
    ),
    (
        "test",
        "Would you like practice questions or tips for preparing for your test?",
    ),
    (
        "homework",
        "I'd be happy to provide guidance on your homework. What subject is it for?",
    ),
    (
        "",
        "I didn't catch that. Could you please rephrase your question?",
    ),
];

/// Any of these in an utterance switches the conversation to mathematics.
pub const MATH_TRIGGERS: &[&str] = &["math", "equation", "algebra", "geometry"];

pub const DEFAULT_REPLY: &str =
    "I'm not sure how to respond to that. Could you ask something related to your coursework?";

const FRACTION_REPLY: &str = "Fractions represent parts of a whole. For example, 3/4 means three out of four equal parts. Would you like to learn more about adding, subtracting, multiplying, or dividing fractions?";
const ALGEBRA_REPLY: &str = "Algebra uses symbols (like x and y) to represent numbers and express mathematical relationships. What specific algebraic concept do you need help with?";
const HISTORY_REPLY: &str = "History helps us understand our past and how it shapes the present. Which historical period or event are you studying?";
const WRITING_REPLY: &str = "Good writing skills are essential for effective communication. Would you like tips on grammar, essay structure, or creative writing?";

/// Which table a reply was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    General,
    Mathematics,
}

/// Outcome of [`respond`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub text: &'static str,
    /// Focus flag the conversation should carry after this reply
    pub math_focused: bool,
    pub table: TableKind,
}

/// Pick the assistant's reply for `utterance`.
///
/// Pure in `(utterance, is_math_focused)`: no history, no randomness. Every
/// input resolves to a reply; misses fall through to [`DEFAULT_REPLY`].
pub fn respond(utterance: &str, is_math_focused: bool) -> Reply {
    let lower = utterance.to_lowercase();

    if is_math_focused || mentions_math(&lower) {
        let text = first_match(MATH_RESPONSES, &lower).unwrap_or(DEFAULT_REPLY);
        tracing::debug!(table = "mathematics", matched = text != DEFAULT_REPLY, "selected reply");
        return Reply {
            text,
            math_focused: true,
            table: TableKind::Mathematics,
        };
    }

    let (text, math_focused) = match first_match(GENERAL_RESPONSES, &lower) {
        Some(text) => (text, is_math_focused),
        None => subject_fallback(&lower).unwrap_or((DEFAULT_REPLY, is_math_focused)),
    };
    tracing::debug!(table = "general", matched = text != DEFAULT_REPLY, "selected reply");

    Reply {
        text,
        math_focused,
        table: TableKind::General,
    }
}

/// True if the lowercased utterance contains any of [`MATH_TRIGGERS`].
pub fn mentions_math(lower: &str) -> bool {
    MATH_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}

/// First non-empty keyword contained in `lower`, in declaration order.
fn first_match(table: ResponseTable, lower: &str) -> Option<&'static str> {
    table
        .iter()
        .filter(|(keyword, _)| !keyword.is_empty())
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, reply)| *reply)
}

/// Subject checks applied after a general-table miss. The bool is the new
/// focus; only the math subjects force it on.
fn subject_fallback(lower: &str) -> Option<(&'static str, bool)> {
    if lower.contains("fraction") {
        Some((FRACTION_REPLY, true))
    } else if lower.contains("algebra") {
        // "algebra" already selects the math table, kept for precedence order
        Some((ALGEBRA_REPLY, true))
    } else if lower.contains("history") {
        Some((HISTORY_REPLY, false))
    } else if ["grammar", "write", "essay"].iter().any(|w| lower.contains(w)) {
        Some((WRITING_REPLY, false))
    } else {
        None
    }
}
