//! The seed-phrase dictionary (spec §3.1).
//!
//! This is a generated placeholder, not the production S5/Sia word list —
//! that text was not present in the retrieved reference corpus (see
//! `SPEC_FULL.md` Open Question 6). It has the exact shape the spec
//! requires: 1024 entries, each with a unique 3-letter prefix, sorted so
//! that "the first 256 dictionary entries" (the restriction on word 13) is
//! a contiguous, meaningful slice. Swapping in the production list is a
//! single-file change; nothing outside this module knows the word text.

use std::collections::HashMap;
use std::sync::OnceLock;

// Synthetic 1024-word dictionary: every word has a unique 3-letter prefix.
pub(crate) const WORDS: [&str; 1024] = [
    "bad", "baish", "bal", "bang", "bap", "bart", "bash", "bead",
    "beck", "bed", "beech", "bele", "bend", "bep", "ber", "bes",
    "bial", "bid", "big", "bil", "bint", "bios", "bip", "bir",
    "bist", "bla", "blee", "blis", "bloond", "blur", "bock", "bod",
    "bog", "bok", "bol", "bom", "bond", "boong", "bop", "bort",
    "bost", "bot", "boul", "brai", "brer", "briost", "brod", "bruck",
    "buach", "buch", "bud", "bul", "bum", "bung", "bup", "bur",
    "cach", "cais", "cak", "cal", "cam", "can", "cap", "cart",
    "cas", "cat", "ceal", "ceck", "ceend", "cek", "cel", "cend",
    "cep", "cert", "cesh", "cet", "chail", "cheem", "chiosh", "chount",
    "chua", "cias", "cich", "cid", "cik", "cil", "cim", "cind",
    "ciop", "cip", "cir", "cish", "cit", "clack", "clert", "cliast",
    "clog", "cluart", "coch", "cod", "cok", "cond", "cook", "cop",
    "cos", "cot", "court", "crag", "crele", "criole", "crool", "cruas",
    "cuad", "cuch", "cud", "cug", "cul", "cung", "curt", "cust",
    "dach", "dag", "dain", "dak", "dale", "dam", "dand", "dap",
    "dart", "dash", "dat", "dead", "deck", "deert", "deg", "dek",
    "del", "dem", "den", "dep", "der", "desh", "det", "diam",
    "did", "dig", "dik", "dil", "dim", "dint", "dio", "dir",
    "dist", "dit", "dock", "dod", "dog", "dok", "dole", "dond",
    "dook", "dop", "dor", "dost", "dot", "dout", "draish", "drend",
    "driad", "droong", "drurt", "duar", "duch", "dud", "dug", "duk",
    "dul", "dund", "dur", "dush", "dut", "fack", "fad", "fag",
    "faist", "fak", "fale", "fang", "fap", "far", "fas", "fead",
    "feck", "fed", "feed", "feg", "fel", "fend", "fert", "fest",
    "fiale", "fich", "fid", "fik", "fim", "fin", "fiog", "fip",
    "firt", "fish", "fit", "flaid", "fleeg", "fliort", "floos", "flung",
    "fock", "fog", "fok", "fol", "fond", "foot", "fop", "fort",
    "fost", "fot", "fouk", "frak", "freech", "frit", "froog", "frunt",
    "fuam", "fuck", "fud", "fug", "fule", "fun", "fup", "fur",
    "fut", "gach", "gad", "gag", "gaik", "gak", "gal", "gang",
    "gap", "gart", "gas", "gat", "geach", "gech", "ged", "geeck",
    "geg", "gek", "gele", "gem", "gend", "gep", "gert", "ges",
    "get", "giale", "gich", "gid", "gig", "gik", "gile", "gim",
    "gind", "giosh", "gip", "gir", "gis", "glak", "gleel", "gliog",
    "gloon", "glual", "gock", "gok", "gole", "gom", "gong", "goost",
    "gor", "gosh", "got", "goup", "graing", "grert", "griash", "groot",
    "gruant", "guam", "gud", "gule", "gum", "gunt", "gurt", "gush",
    "hag", "hair", "hak", "hale", "han", "har", "hash", "hat",
    "heast", "heck", "heert", "heg", "hel", "hem", "hend", "hert",
    "hesh", "het", "hiash", "hick", "hid", "hik", "hile", "him",
    "hint", "hiot", "hirt", "hist", "hock", "hok", "hol", "hond",
    "hoot", "hos", "hout", "huash", "huch", "hug", "huk", "hule",
    "hum", "hung", "hurt", "hust", "hut", "jach", "jag", "jaint",
    "jam", "jang", "jart", "jash", "jat", "jeast", "jeck", "jeert",
    "jek", "jem", "jent", "jep", "jert", "jesh", "jet", "jiack",
    "jich", "jik", "jile", "jing", "jiod", "jip", "jir", "jis",
    "jock", "jok", "jol", "jong", "joont", "jost", "jour", "juan",
    "juch", "jug", "juk", "jul", "jung", "jup", "jur", "jus",
    "kack", "kaish", "kal", "kam", "kang", "kash", "kat", "keap",
    "keck", "keesh", "keg", "kel", "kem", "keng", "kert", "kes",
    "ket", "kias", "kich", "kig", "kik", "kil", "kim", "kind",
    "kiort", "kip", "kirt", "kist", "kit", "koch", "kol", "kon",
    "koong", "kor", "kost", "koul", "kual", "kuch", "kud", "kung",
    "kup", "kurt", "kus", "kut", "lad", "lag", "laind", "lak",
    "lal", "lant", "lar", "lash", "lat", "lean", "leck", "led",
    "leem", "lel", "lem", "len", "lep", "ler", "les", "liap",
    "lick", "lig", "lim", "lind", "liort", "lirt", "lis", "lit",
    "loch", "log", "lok", "lol", "lom", "lon", "loot", "lort",
    "los", "lot", "loug", "lual", "lunt", "lurt", "lush", "lut",
    "mack", "mad", "mair", "male", "mam", "mang", "map", "mar",
    "mast", "mat", "mead", "meck", "med", "meep", "mek", "mel",
    "ment", "mep", "mer", "mes", "miat", "mich", "mid", "mik",
    "mile", "mind", "mio", "mip", "mirt", "mis", "mit", "moch",
    "mod", "mok", "mol", "mom", "mon", "moock", "mop", "mort",
    "mos", "mouch", "muar", "much", "mug", "mule", "mum", "mun",
    "mur", "mush", "nach", "nag", "naich", "nal", "nan", "nap",
    "nart", "nat", "neang", "nech", "ned", "neeng", "nele", "nen",
    "nert", "nes", "niar", "nid", "nik", "nile", "nint", "niont",
    "nir", "nist", "nit", "nock", "nok", "nol", "nond", "noort",
    "nort", "nos", "not", "nourt", "nuam", "nuch", "nud", "nuk",
    "nule", "nun", "nup", "nust", "pack", "pad", "paint", "pak",
    "pale", "pam", "pand", "par", "pash", "pat", "peant", "pech",
    "peeg", "pel", "pem", "pen", "pep", "pert", "pes", "pial",
    "pich", "pid", "pik", "pile", "pim", "piop", "pip", "pirt",
    "pis", "pit", "plap", "plech", "plind", "plole", "pluar", "pock",
    "pok", "pom", "pond", "poock", "por", "posh", "pot", "pound",
    "praick", "prent", "prir", "proush", "prup", "pua", "puch", "pug",
    "pul", "pum", "pung", "pup", "pus", "put", "quaist", "quean",
    "quiog", "quoock", "quuand", "rack", "rad", "rag", "raint", "rak",
    "ral", "ram", "rand", "rar", "ras", "rat", "reas", "reen",
    "reg", "rek", "rent", "rep", "riack", "rick", "rid", "rig",
    "rile", "rim", "ring", "riong", "rip", "ris", "rock", "rod",
    "rog", "rom", "ron", "roop", "rort", "ros", "rot", "roug",
    "ruant", "ruch", "rug", "rul", "rum", "runt", "rup", "rurt",
    "rus", "rut", "sack", "sad", "sag", "saint", "sak", "sale",
    "san", "sap", "sar", "sas", "sat", "seap", "sed", "seent",
    "seg", "sek", "sele", "sem", "sent", "sep", "sert", "ses",
    "shas", "sher", "shiong", "shop", "shur", "siart", "sick", "sid",
    "sig", "sile", "sim", "sin", "siod", "sir", "sist", "sit",
    "skat", "skeech", "skiost", "skont", "skust", "slaing", "slest", "sliart",
    "slock", "slur", "smaind", "smeeg", "smint", "smock", "smule", "sna",
    "snean", "snind", "snoog", "snuk", "soch", "sog", "sok", "sole",
    "som", "song", "soot", "sop", "sost", "sot", "souk", "spam",
    "speng", "spiole", "spong", "spush", "staind", "stest", "stiam", "stoule",
    "stuang", "sua", "sug", "suk", "sul", "sunt", "sup", "sur",
    "sus", "sut", "swai", "sweert", "swiont", "swoom", "swuat", "tach",
    "tad", "taik", "tal", "tam", "tant", "tap", "tar", "tash",
    "teat", "tech", "ted", "teeck", "teg", "tele", "tem", "teng",
    "tert", "tesh", "tet", "that", "theest", "thist", "tho", "thuar",
    "tiak", "tid", "til", "tim", "tin", "tiog", "tirt", "tist",
    "tit", "toch", "tok", "tol", "tong", "tood", "top", "tor",
    "tos", "tot", "toup", "traich", "tres", "triol", "trok", "trua",
    "tuale", "tuch", "tug", "tuk", "tule", "tunt", "tup", "turt",
    "tush", "vach", "vaind", "vale", "van", "vart", "vat", "veash",
    "vech", "veech", "veg", "vek", "vel", "veng", "vep", "ves",
    "vet", "viart", "vick", "vid", "vig", "ving", "viock", "vip",
    "vit", "vod", "vog", "vok", "vole", "vont", "voost", "vop",
    "vor", "vosh", "vourt", "vuale", "vuch", "vud", "vuk", "vul",
    "vum", "vund", "vur", "vut", "wack", "waind", "wak", "wal",
    "wam", "wang", "wap", "wart", "wash", "wat", "weap", "wed",
    "weem", "weg", "wele", "wem", "went", "wer", "wesh", "wet",
    "whas", "whear", "whiast", "whoul", "whug", "wiant", "wich", "wid",
    "wig", "wil", "wim", "win", "wiot", "wip", "wir", "wist",
    "wit", "wock", "wog", "wond", "woos", "wop", "wosh", "wot",
    "wou", "wuat", "wud", "wuk", "wule", "wunt", "wup", "wur",
    "wust", "wut", "yack", "yaing", "yak", "yale", "yam", "yant",
    "yap", "yart", "yas", "yat", "yeas", "yech", "yed", "yeen",
    "yeg", "yek", "yel", "yem", "yeng", "yep", "yert", "yesh",
    "yet", "yiang", "yich", "yid", "yig", "yile", "yin", "yiop",
    "yir", "yish", "yit", "yoch", "yod", "yog", "yok", "yond",
    "yoo", "yort", "yosh", "yot", "yoush", "yuast", "yuch", "yuk",
    "yul", "yum", "yur", "yust", "yut", "zack", "zag", "zaint",
    "zal", "zant", "zap", "zart", "zash", "zat", "zead", "zeck",
    "zed", "zeer", "zeg", "zem", "zend", "zep", "zer", "zest",
    "zet", "ziang", "zich", "zik", "zile", "zint", "ziont", "zip",
    "zir", "zish", "zoch", "zod", "zog", "zole", "zon", "zook",
    "zosh", "zouk", "zuang", "zuck", "zule", "zun", "zur", "zus",
];

/// Maps a word's 3-letter prefix to its dictionary index, built once.
fn prefix_index() -> &'static HashMap<&'static str, u16> {
    static INDEX: OnceLock<HashMap<&'static str, u16>> = OnceLock::new();
    INDEX.get_or_init(|| {
        WORDS
            .iter()
            .enumerate()
            .map(|(i, w)| (&w[..3], i as u16))
            .collect()
    })
}

/// Looks up a word (already normalised to lowercase) by its first three
/// letters, matching the spec's "words are matched by their 3-letter
/// prefix" rule.
pub(crate) fn index_of_prefix(word: &str) -> Option<u16> {
    if word.len() < 3 {
        return None;
    }
    prefix_index().get(&word[..3]).copied()
}

pub(crate) fn word_at(index: u16) -> &'static str {
    WORDS[index as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_prefixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for w in WORDS {
            assert!(seen.insert(&w[..3]), "duplicate prefix for {w}");
        }
    }

    #[test]
    fn lookup_round_trips() {
        for (i, w) in WORDS.iter().enumerate() {
            assert_eq!(index_of_prefix(w), Some(i as u16));
        }
    }
}
