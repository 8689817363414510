//! The chapter compiled into the binary.

use super::{ChapterData, TextSegment};

/// Chapter one, used when no chapter file is configured.
pub fn builtin_chapter() -> ChapterData {
    let segments: [(f64, &str); 10] = [
        (0.0, "Spring was ending on Mount Song. Wind moved through the pines, and petals from the wild peach trees drifted down the stone steps like a light snow."),
        (14.5, "A young woman in pale yellow rode slowly up the mountain road, a short sword at her belt. Her name was Guo Xiang, and she had been travelling alone for three years."),
        (31.0, "She was searching for a man she had met only once, on a night of lanterns and fireworks. He had given her three golden needles and three wishes, and then he was gone."),
        (49.2, "Every inn she entered, every ferry she crossed, she asked the same question. No one had seen the one-armed swordsman and the woman in white who travelled at his side."),
        (66.8, "Now she had come to Shaolin, where the monks were said to hear every rumour of the rivers and lakes. If anyone knew where he had gone, it would be them."),
        (82.0, "At the foot of the last flight of steps she dismounted and looked up at the temple roofs. Bells sounded somewhere inside, slow and even, like a heartbeat."),
        (97.4, "She thought of the verse she had heard as a girl: at the edge of the world, thinking of you, I cannot forget. She had laughed at it then. She did not laugh now."),
        (114.0, "A novice monk met her at the gate and bowed. Women were not permitted inside the inner courts, he said, but the abbot would send someone to hear her question."),
        (129.6, "Guo Xiang waited beneath an old cypress. The shadows of its branches moved across the flagstones, and she found she was counting them without meaning to."),
        (145.0, "When at last an old monk came out to greet her, his answer was the one she had heard a hundred times before. And still she thanked him, and still she did not turn back."),
    ];

    ChapterData {
        title: "The Heaven Sword and Dragon Saber".to_string(),
        subtitle: "Chapter One: At the Edge of the World, Thinking of You".to_string(),
        content: segments
            .iter()
            .enumerate()
            .map(|(i, (start, text))| TextSegment::new(i as u32 + 1, *start, *text))
            .collect(),
    }
}
