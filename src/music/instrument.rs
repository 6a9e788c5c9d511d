// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! General MIDI instrument names.
//!
//! Track instruments are free-form strings; they are resolved to a GM
//! program number only when a piece is exported.

/// Program used when an instrument name is not recognized ("piano")
pub const FALLBACK_PROGRAM: u8 = 0;

/// Instrument names routed to the percussion channel
pub const PERCUSSION_ALIASES: [&str; 3] = ["drums", "percussion", "drum_kit"];

/// GM program numbers by normalized instrument name
const GM_PROGRAMS: &[(&str, u8)] = &[
    // Piano
    ("piano", 0),
    ("acoustic_grand_piano", 0),
    ("bright_acoustic_piano", 1),
    ("electric_grand_piano", 2),
    ("honky_tonk_piano", 3),
    ("electric_piano_1", 4),
    ("electric_piano_2", 5),
    ("harpsichord", 6),
    ("clavinet", 7),
    // Chromatic percussion
    ("celesta", 8),
    ("glockenspiel", 9),
    ("music_box", 10),
    ("vibraphone", 11),
    ("marimba", 12),
    ("xylophone", 13),
    ("tubular_bells", 14),
    ("dulcimer", 15),
    // Organ
    ("organ", 16),
    ("drawbar_organ", 16),
    ("percussive_organ", 17),
    ("rock_organ", 18),
    ("church_organ", 19),
    ("reed_organ", 20),
    ("accordion", 21),
    ("harmonica", 22),
    ("tango_accordion", 23),
    // Guitar
    ("guitar", 24),
    ("acoustic_guitar_nylon", 24),
    ("acoustic_guitar_steel", 25),
    ("electric_guitar_jazz", 26),
    ("electric_guitar_clean", 27),
    ("electric_guitar_muted", 28),
    ("overdriven_guitar", 29),
    ("distortion_guitar", 30),
    ("guitar_harmonics", 31),
    // Bass
    ("bass", 32),
    ("acoustic_bass", 32),
    ("electric_bass_finger", 33),
    ("electric_bass_pick", 34),
    ("fretless_bass", 35),
    ("slap_bass_1", 36),
    ("slap_bass_2", 37),
    ("synth_bass_1", 38),
    ("synth_bass_2", 39),
    // Strings
    ("violin", 40),
    ("viola", 41),
    ("cello", 42),
    ("contrabass", 43),
    ("tremolo_strings", 44),
    ("pizzicato_strings", 45),
    ("orchestral_harp", 46),
    ("harp", 46),
    ("timpani", 47),
    // Ensemble
    ("strings", 48),
    ("string_ensemble_1", 48),
    ("string_ensemble_2", 49),
    ("synth_strings_1", 50),
    ("synth_strings_2", 51),
    ("choir_aahs", 52),
    ("choir", 52),
    ("voice_oohs", 53),
    ("synth_voice", 54),
    ("orchestra_hit", 55),
    // Brass
    ("trumpet", 56),
    ("trombone", 57),
    ("tuba", 58),
    ("muted_trumpet", 59),
    ("french_horn", 60),
    ("brass_section", 61),
    ("brass", 61),
    ("synth_brass_1", 62),
    ("synth_brass_2", 63),
    // Reed
    ("saxophone", 64),
    ("soprano_sax", 64),
    ("alto_sax", 65),
    ("tenor_sax", 66),
    ("baritone_sax", 67),
    ("oboe", 68),
    ("english_horn", 69),
    ("bassoon", 70),
    ("clarinet", 71),
    // Pipe
    ("piccolo", 72),
    ("flute", 73),
    ("recorder", 74),
    ("pan_flute", 75),
    ("blown_bottle", 76),
    ("shakuhachi", 77),
    ("whistle", 78),
    ("ocarina", 79),
    // Synth lead
    ("lead", 80),
    ("square_lead", 80),
    ("sawtooth_lead", 81),
    ("calliope_lead", 82),
    ("chiff_lead", 83),
    ("charang_lead", 84),
    ("voice_lead", 85),
    ("fifths_lead", 86),
    ("bass_lead", 87),
    // Synth pad
    ("pad", 88),
    ("new_age_pad", 88),
    ("warm_pad", 89),
    ("polysynth_pad", 90),
    ("choir_pad", 91),
    ("bowed_pad", 92),
    ("metallic_pad", 93),
    ("halo_pad", 94),
    ("sweep_pad", 95),
    // Synth effects
    ("fx_rain", 96),
    ("fx_soundtrack", 97),
    ("fx_crystal", 98),
    ("fx_atmosphere", 99),
    ("fx_brightness", 100),
    ("fx_goblins", 101),
    ("fx_echoes", 102),
    ("fx_sci_fi", 103),
    // Ethnic
    ("sitar", 104),
    ("banjo", 105),
    ("shamisen", 106),
    ("koto", 107),
    ("kalimba", 108),
    ("bagpipe", 109),
    ("fiddle", 110),
    ("shanai", 111),
    // Percussive
    ("tinkle_bell", 112),
    ("agogo", 113),
    ("steel_drums", 114),
    ("woodblock", 115),
    ("taiko_drum", 116),
    ("melodic_tom", 117),
    ("synth_drum", 118),
    ("reverse_cymbal", 119),
    // Sound effects
    ("guitar_fret_noise", 120),
    ("breath_noise", 121),
    ("seashore", 122),
    ("bird_tweet", 123),
    ("telephone_ring", 124),
    ("helicopter", 125),
    ("applause", 126),
    ("gunshot", 127),
];

/// Normalize an instrument name for lookup ("Electric Piano-1" -> "electric_piano_1")
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Check whether an instrument plays on the percussion channel
pub fn is_percussion(instrument: &str) -> bool {
    let normalized = normalize(instrument);
    PERCUSSION_ALIASES.contains(&normalized.as_str())
}

/// Look up a GM program, if the name is known
pub fn lookup_program(instrument: &str) -> Option<u8> {
    let normalized = normalize(instrument);
    GM_PROGRAMS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, program)| program)
}

/// GM program for an instrument, falling back to piano
pub fn program_for(instrument: &str) -> u8 {
    lookup_program(instrument).unwrap_or(FALLBACK_PROGRAM)
}
