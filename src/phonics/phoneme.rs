use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phoneme {
    pub symbol: String,
    pub ipa: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub example_words: Vec<String>,
}

impl Phoneme {
    pub fn first_tip(&self) -> Option<&str> {
        self.tips.first().map(String::as_str).filter(|t| !t.trim().is_empty())
    }
}

struct CatalogEntry {
    symbol: &'static str,
    ipa: &'static str,
    category: &'static str,
    description: &'static str,
    tips: &'static [&'static str],
    example_words: &'static [&'static str],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        symbol: "a",
        ipa: "æ",
        category: "short vowel",
        description: "the short a sound, like in apple",
        tips: &[
            "Open your mouth wide and keep your tongue low.",
            "Think of the sound you make when you see an apple.",
        ],
        example_words: &["cat", "hat", "map", "apple"],
    },
    CatalogEntry {
        symbol: "e",
        ipa: "ɛ",
        category: "short vowel",
        description: "the short e sound, like in egg",
        tips: &[
            "Smile a little and keep your mouth half open.",
            "Keep the sound short and quick.",
        ],
        example_words: &["bed", "pen", "red", "egg"],
    },
    CatalogEntry {
        symbol: "i",
        ipa: "ɪ",
        category: "short vowel",
        description: "the short i sound, like in igloo",
        tips: &[
            "Keep your lips relaxed and your mouth only a little open.",
            "Say it quickly, like a tiny hiccup.",
        ],
        example_words: &["sit", "pig", "fish", "igloo"],
    },
    CatalogEntry {
        symbol: "o",
        ipa: "ɒ",
        category: "short vowel",
        description: "the short o sound, like in octopus",
        tips: &[
            "Make your mouth into a round shape.",
            "Drop your jaw like you are at the doctor saying ahh.",
        ],
        example_words: &["dog", "hot", "box", "octopus"],
    },
    CatalogEntry {
        symbol: "u",
        ipa: "ʌ",
        category: "short vowel",
        description: "the short u sound, like in umbrella",
        tips: &[
            "Relax your mouth and push the sound from your tummy.",
            "It sounds like a little grunt: uh.",
        ],
        example_words: &["sun", "cup", "bug", "umbrella"],
    },
    CatalogEntry {
        symbol: "sh",
        ipa: "ʃ",
        category: "digraph",
        description: "the quiet sh sound, like asking someone to be quiet",
        tips: &[
            "Push your lips forward and blow air gently.",
            "Put a finger to your lips and say shhh.",
        ],
        example_words: &["ship", "shop", "fish", "shell"],
    },
    CatalogEntry {
        symbol: "ch",
        ipa: "tʃ",
        category: "digraph",
        description: "the ch sound, like a train going choo choo",
        tips: &[
            "Start with your tongue touching the top of your mouth, then let the air pop out.",
            "Pretend you are a train: ch, ch, ch.",
        ],
        example_words: &["chip", "chin", "lunch", "chick"],
    },
    CatalogEntry {
        symbol: "th",
        ipa: "θ",
        category: "digraph",
        description: "the th sound, made with your tongue between your teeth",
        tips: &[
            "Put the tip of your tongue gently between your teeth.",
            "Blow air softly over your tongue.",
        ],
        example_words: &["thin", "bath", "thumb", "moth"],
    },
    CatalogEntry {
        symbol: "ck",
        ipa: "k",
        category: "digraph",
        description: "the ck sound at the end of a word, like in duck",
        tips: &[
            "Lift the back of your tongue and let the sound click out.",
            "The c and k work together to make one sound.",
        ],
        example_words: &["duck", "sock", "back", "kick"],
    },
];

impl From<&CatalogEntry> for Phoneme {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            symbol: entry.symbol.to_string(),
            ipa: entry.ipa.to_string(),
            category: entry.category.to_string(),
            description: entry.description.to_string(),
            tips: entry.tips.iter().map(|t| t.to_string()).collect(),
            example_words: entry.example_words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

pub fn catalog() -> Vec<Phoneme> {
    CATALOG.iter().map(Phoneme::from).collect()
}

pub fn find(symbol: &str) -> Option<Phoneme> {
    let needle = symbol.trim().to_lowercase();
    CATALOG
        .iter()
        .find(|entry| entry.symbol == needle)
        .map(Phoneme::from)
}
