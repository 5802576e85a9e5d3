//! Native enumerations shared with the host.
//!
//! The host declares its own copies of these enums. Their ordinals are not
//! assumed to match the declaration order below; the bridge maps them by
//! constant name.

/// Languages the engine can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// French
    French,
    /// English
    English,
    /// Japanese
    Japanese,
}

impl Language {
    /// Resolve an ISO 639-1 code
    pub fn from_iso(code: &str) -> Option<Self> {
        match code {
            "fr" => Some(Self::French),
            "en" => Some(Self::English),
            "ja" => Some(Self::Japanese),
            _ => None,
        }
    }

    /// ISO 639-1 code
    pub fn iso_code(self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }
}

/// Tense of a verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerbTense {
    /// Present
    Present,
    /// Punctual present
    PunctualPresent,
    /// Past
    Past,
    /// Punctual past
    PunctualPast,
}

/// Grammatical role of a child expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammaticalType {
    /// Subject
    Subject,
    /// Object
    Object,
    /// Owner
    Owner,
}

/// Modality of a verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerbGoal {
    /// Ability ("can")
    Ability,
    /// Advice ("should")
    Advice,
    /// Conditional
    Conditional,
    /// Mandatory ("must")
    Mandatory,
    /// Notification
    Notification,
    /// Possibility ("may")
    Possibility,
}

/// Polarity of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaturalLanguagePolarity {
    /// Affirmative
    Identical,
    /// Negated
    Opposite,
}

/// Grammatical number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityType {
    /// Singular
    One,
    /// Plural
    Many,
}

/// Determiner kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// "the"
    Definite,
    /// "a"
    Indefinite,
    /// No determiner
    Undefined,
}

/// Kind of feedback to produce about an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticTypeOfFeedback {
    /// Ask for more details
    AskForAdditionalInformation,
    /// Mention what is similar in memory
    ReactOnSimilarities,
    /// Express a sentiment
    Sentiment,
}

/// Where an expression came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticSource {
    /// Speech recognition
    Asr,
    /// An event
    Event,
    /// Written text
    WrittenText,
    /// Text to speech
    Tts,
    /// A semantic reaction
    SemReaction,
    /// A method call
    MethodCall,
    /// A property
    Property,
    /// Unknown
    Unknown,
}

/// Annotation describing the nature of a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextualAnnotation {
    /// The robot announces something it will do
    NotifySomethingWillBeDone,
    /// Feedback on something that was taught
    TeachingFeedback,
    /// Request to be taught from outside
    ExternalTeachingRequest,
    /// A behaviour
    Behavior,
    /// An answer
    Answer,
    /// A question
    Question,
    /// Feedback
    Feedback,
    /// No behaviour was found
    BehaviorNotFound,
    /// No answer was found
    AnswerNotFound,
    /// Every condition was removed
    RemoveAllConditions,
    /// Proactive speech
    Proactive,
}

impl ContextualAnnotation {
    /// Wire name understood by the host
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotifySomethingWillBeDone => "notify_something_will_be_done",
            Self::TeachingFeedback => "teaching_feedback",
            Self::ExternalTeachingRequest => "external_teaching_request",
            Self::Behavior => "behavior",
            Self::Answer => "answer",
            Self::Question => "question",
            Self::Feedback => "feedback",
            Self::BehaviorNotFound => "behavior_not_found",
            Self::AnswerNotFound => "answer_not_found",
            Self::RemoveAllConditions => "remove_all_conditions",
            Self::Proactive => "proactive",
        }
    }
}
