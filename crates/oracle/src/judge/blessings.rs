//! Rotating blessing texts for the deterministic fallback path. Selection is
//! keyed by the draw seed rather than a process RNG so a recorded outcome is
//! reproducible in full, text included.

pub const BELOW_MINIMUM_BLESSING: &str = "禮輕情意重 (Lǐ qīng qíng yì zhòng) — The thought counts, but the celestial treasury has standards. Bring a worthier offering, seeker.";

pub const MISSING_EIGHT_BLESSING: &str = "八字沒一撇 (Bā zì méi yī piě) — Not a single 8 in your offering! The God of Wealth cannot bless what the sacred number does not touch.";

const TIER_1: [&str; 3] = [
    "空手而歸 (Kōng shǒu ér guī) — You leave as you came... empty-handed. The dumplings mock you from the celestial kitchen.",
    "時運不濟 (Shí yùn bù jì) — The stars are not aligned for you today, seeker. Even the God of Wealth cannot bless an empty vessel.",
    "再接再厲 (Zài jiē zài lì) — Not every offering moves the heavens. Dust yourself off, seeker. Persistence is its own form of luck.",
];

const TIER_2: [&str; 3] = [
    "失而復得 (Shī ér fù dé) — What was lost has been returned. Your offering circles back to you like a boomerang of fate.",
    "物歸原主 (Wù guī yuán zhǔ) — The cosmos returns what is yours. No profit, no loss — perfectly balanced, as the Tao intended.",
    "不賠不賺 (Bù péi bù zhuàn) — No loss, no gain. CáiShén has weighed your fortune and found it... neutral. Try again with a bolder wish.",
];

const TIER_3: [&str; 3] = [
    "財源滾滾 (Cái yuán gǔn gǔn) — A small stream of wealth flows your way. Not a river, but enough to wet your feet in fortune.",
    "錦上添花 (Jǐn shàng tiān huā) — A flower upon silk — a small blessing to brighten your day. The ancestors nod with mild approval.",
    "吉星高照 (Jí xīng gāo zhào) — A lucky star shines upon you, if only briefly. Take this blessing and spend it wisely, seeker.",
];

const TIER_4: [&str; 3] = [
    "金豬送福 (Jīn zhū sòng fú) — The Golden Pig gallops from the heavens bearing gifts! Your ancestors are beaming with pride!",
    "大吉大利 (Dàjí dàlì) — Great luck descends upon you! The celestial treasury swings open and gold pours forth!",
    "財運亨通 (Cái yùn hēng tōng) — Your fortune flows without obstruction! The rivers of wealth part for you today, seeker!",
];

const TIER_5: [&str; 3] = [
    "發發發 (Fā fā fā) — JACKPOT! The celestial vault cracks open with blinding golden light! CáiShén declares you worthy of great fortune!",
    "財神駕到 (Cáishén jià dào) — The God of Wealth descends from the heavens on a cloud of gold! JACKPOT! Your prosperity echoes through the cosmos!",
    "金玉滿堂 (Jīn yù mǎn táng) — Gold and jade fill your halls! JACKPOT! The treasury doors fly open and fortune floods in!",
];

const TIER_6: [&str; 3] = [
    "天啊 (Tiān a) — HEAVENS ABOVE! SUPER JACKPOT! The celestial treasury itself trembles! 發發發! Even the Jade Emperor peers down in disbelief!",
    "八八大發 (Bā bā dà fā) — 88 times fortune! SUPER JACKPOT! The immortals drop their teacups in shock! CáiShén himself bows to your impossible luck!",
    "千載難逢 (Qiān zǎi nán féng) — Once in a thousand years! SUPER JACKPOT! The cosmos erupts in golden fireworks! Your name is etched in the Book of Infinite Fortune!",
];

/// Blessing for a fallback tier decision, rotated by the draw seed.
pub fn fallback_blessing(tier: u8, seed: usize) -> String {
    let table: &[&str] = match tier {
        2 => &TIER_2,
        3 => &TIER_3,
        4 => &TIER_4,
        5 => &TIER_5,
        6 => &TIER_6,
        _ => &TIER_1,
    };
    table[seed % table.len()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_deterministic_and_varied() {
        assert_eq!(fallback_blessing(3, 7), fallback_blessing(3, 7));
        assert_ne!(fallback_blessing(3, 0), fallback_blessing(3, 1));
    }

    #[test]
    fn unknown_tier_falls_back_to_the_lowest_table() {
        assert_eq!(fallback_blessing(0, 0), fallback_blessing(1, 0));
    }
}
