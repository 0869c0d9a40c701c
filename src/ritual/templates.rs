//! Built-in prayer template.
//!
//! Six steps per rakat followed by three closing steps.  The second
//! prostration of each rakat is folded into the `jalsa` step's narration.

use super::step::{Posture, RitualStep, RitualTemplate};

pub static CYCLE_STEPS: [RitualStep; 6] = [
    RitualStep {
        id: "takbir",
        posture: Posture::Standing,
        narration: "Stand facing the qibla, raise your hands and say the opening takbir.",
        sacred_text: Some("اللَّهُ أَكْبَرُ"),
        recitations: &[],
        hint: "Raise hands to the ears",
    },
    RitualStep {
        id: "qiyam",
        posture: Posture::Standing,
        narration: "Place your right hand over your left and recite Al-Fatiha.",
        sacred_text: Some("بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ"),
        recitations: &[
            "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ",
            "الرَّحْمَٰنِ الرَّحِيمِ",
            "مَالِكِ يَوْمِ الدِّينِ",
        ],
        hint: "Recite Al-Fatiha",
    },
    RitualStep {
        id: "ruku",
        posture: Posture::Bowing,
        narration: "Bow with your back straight and hands on your knees.",
        sacred_text: Some("سُبْحَانَ رَبِّيَ الْعَظِيمِ"),
        recitations: &[],
        hint: "Bow, back level",
    },
    RitualStep {
        id: "itidal",
        posture: Posture::Standing,
        narration: "Rise from bowing and stand upright.",
        sacred_text: Some("سَمِعَ اللَّهُ لِمَنْ حَمِدَهُ"),
        recitations: &["رَبَّنَا وَلَكَ الْحَمْدُ"],
        hint: "Stand upright",
    },
    RitualStep {
        id: "sujud",
        posture: Posture::Prostrate,
        narration: "Prostrate with forehead, nose, palms, knees and toes on the ground.",
        sacred_text: Some("سُبْحَانَ رَبِّيَ الْأَعْلَى"),
        recitations: &[],
        hint: "Prostrate",
    },
    RitualStep {
        id: "jalsa",
        posture: Posture::Sitting,
        narration: "Sit briefly between the prostrations, then prostrate a second time.",
        sacred_text: Some("رَبِّ اغْفِرْ لِي"),
        recitations: &["سُبْحَانَ رَبِّيَ الْأَعْلَى"],
        hint: "Sit, then prostrate again",
    },
];

pub static CLOSING_STEPS: [RitualStep; 3] = [
    RitualStep {
        id: "tashahhud",
        posture: Posture::Sitting,
        narration: "Sit for the final tashahhud and raise your index finger.",
        sacred_text: Some("التَّحِيَّاتُ لِلَّهِ وَالصَّلَوَاتُ وَالطَّيِّبَاتُ"),
        recitations: &["أَشْهَدُ أَنْ لَا إِلَٰهَ إِلَّا اللَّهُ"],
        hint: "Final sitting",
    },
    RitualStep {
        id: "salawat",
        posture: Posture::Sitting,
        narration: "Send blessings upon the Prophet.",
        sacred_text: Some("اللَّهُمَّ صَلِّ عَلَى مُحَمَّدٍ وَعَلَى آلِ مُحَمَّدٍ"),
        recitations: &[],
        hint: "Salawat",
    },
    RitualStep {
        id: "taslim",
        posture: Posture::Sitting,
        narration: "Turn your head to the right, then to the left, giving the salam.",
        sacred_text: Some("السَّلَامُ عَلَيْكُمْ وَرَحْمَةُ اللَّهِ"),
        recitations: &["السَّلَامُ عَلَيْكُمْ وَرَحْمَةُ اللَّهِ"],
        hint: "Salam right and left",
    },
];

/// The template used unless the caller supplies its own.
pub fn default_template() -> RitualTemplate {
    RitualTemplate {
        cycle: &CYCLE_STEPS,
        closing: &CLOSING_STEPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_template_shape() {
        let t = default_template();
        assert_eq!(t.steps_per_cycle(), 6);
        assert_eq!(t.closing.len(), 3);
        assert_eq!(t.last_step_index(), Some(5));
    }

    #[test]
    fn step_ids_are_unique() {
        let t = default_template();
        let ids: HashSet<_> = t.cycle.iter().chain(t.closing).map(|s| s.id).collect();
        assert_eq!(ids.len(), t.cycle.len() + t.closing.len());
    }

    #[test]
    fn cycle_order_and_postures() {
        let t = default_template();
        let order: Vec<_> = t.cycle.iter().map(|s| (s.id, s.posture)).collect();
        assert_eq!(
            order,
            vec![
                ("takbir", Posture::Standing),
                ("qiyam", Posture::Standing),
                ("ruku", Posture::Bowing),
                ("itidal", Posture::Standing),
                ("sujud", Posture::Prostrate),
                ("jalsa", Posture::Sitting),
            ]
        );
    }

    #[test]
    fn cycle_step_out_of_range_is_none() {
        assert!(default_template().cycle_step(6).is_none());
    }
}
