//! Tiny fonts, built byte by byte for tests
//!
//! [`FontBuilder`] writes the minimum table set a `glyf` font needs
//! (`cmap`, `glyf`, `head`, `hhea`, `hmtx`, `loca`, `maxp`) plus optional
//! `kern` and `OS/2` tables. Without `OS/2`, loaders fall back to `hhea`
//! metrics. [`FontBuilder::build_cff`] writes the same glyphs as an
//! OpenType CFF face, quadratic segments raised to cubics.
//!
//! [`test_font`] is the stock font the workspace tests share: 1000 units per
//! em, ascent 800, descent 200, and the glyphs `A`, `V`, `I`, `O` and space.

use std::path::{Path, PathBuf};

/// One point of a TrueType contour: x, y, on-curve
pub type ContourPoint = (i16, i16, bool);

struct GlyphSpec {
    ch: Option<char>,
    advance: u16,
    contours: Vec<Vec<ContourPoint>>,
}

/// Assembles a TrueType binary
pub struct FontBuilder {
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    line_gap: i16,
    glyphs: Vec<GlyphSpec>,
    /// `kern` subtables: coverage word and pairs
    kern_subtables: Vec<(u16, Vec<(char, char, i16)>)>,
    /// `OS/2` typo ascender, descender (negative) and line gap
    typo_metrics: Option<(i16, i16, i16)>,
}

/// Horizontal format 0 `kern` coverage
pub const KERN_HORIZONTAL: u16 = 0x0001;

impl FontBuilder {
    /// Starts with an empty `.notdef` as glyph 0; `descent` is positive
    pub fn new(units_per_em: u16, ascent: i16, descent: i16, line_gap: i16) -> Self {
        Self {
            units_per_em,
            ascent,
            descent,
            line_gap,
            glyphs: vec![GlyphSpec {
                ch: None,
                advance: units_per_em / 2,
                contours: Vec::new(),
            }],
            kern_subtables: Vec::new(),
            typo_metrics: None,
        }
    }

    /// Adds a glyph mapped from `ch`
    pub fn glyph(mut self, ch: char, advance: u16, contours: Vec<Vec<ContourPoint>>) -> Self {
        self.glyphs.push(GlyphSpec {
            ch: Some(ch),
            advance,
            contours,
        });
        self
    }

    /// Adds a kerning pair to the first horizontal subtable
    pub fn kern(mut self, left: char, right: char, value: i16) -> Self {
        match self
            .kern_subtables
            .iter_mut()
            .find(|(coverage, _)| *coverage == KERN_HORIZONTAL)
        {
            Some((_, pairs)) => pairs.push((left, right, value)),
            None => self
                .kern_subtables
                .push((KERN_HORIZONTAL, vec![(left, right, value)])),
        }
        self
    }

    /// Appends a format 0 subtable with an explicit coverage word
    pub fn kern_subtable(mut self, coverage: u16, pairs: Vec<(char, char, i16)>) -> Self {
        self.kern_subtables.push((coverage, pairs));
        self
    }

    /// Writes an `OS/2` table carrying these typo metrics; `descent` is positive
    pub fn typo_metrics(mut self, ascent: i16, descent: i16, line_gap: i16) -> Self {
        self.typo_metrics = Some((ascent, -descent, line_gap));
        self
    }

    fn glyph_index(&self, ch: char) -> Option<u16> {
        self.glyphs
            .iter()
            .position(|g| g.ch == Some(ch))
            .map(|i| i as u16)
    }

    /// Serializes the font with `glyf` outlines
    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"cmap", self.cmap()),
            (*b"glyf", glyf),
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"hmtx", self.hmtx()),
            (*b"loca", loca),
            (*b"maxp", self.maxp()),
        ];
        self.optional_tables(&mut tables);
        assemble(0x0001_0000, tables)
    }

    /// Serializes the font with `CFF ` outlines
    pub fn build_cff(&self) -> Vec<u8> {
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"CFF ", self.cff()),
            (*b"cmap", self.cmap()),
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"hmtx", self.hmtx()),
            (*b"maxp", self.maxp_cff()),
        ];
        self.optional_tables(&mut tables);
        assemble(u32::from_be_bytes(*b"OTTO"), tables)
    }

    fn optional_tables(&self, tables: &mut Vec<([u8; 4], Vec<u8>)>) {
        if !self.kern_subtables.is_empty() {
            tables.push((*b"kern", self.kern_table()));
        }
        if let Some(typo) = self.typo_metrics {
            tables.push((*b"OS/2", self.os2(typo)));
        }
    }

    fn bbox(&self) -> (i16, i16, i16, i16) {
        let points = self
            .glyphs
            .iter()
            .flat_map(|g| g.contours.iter().flatten());
        points.fold((0, 0, 0, 0), |(x0, y0, x1, y1), &(x, y, _)| {
            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
        })
    }

    fn head(&self) -> Vec<u8> {
        let (x_min, y_min, x_max, y_max) = self.bbox();
        let mut w = Writer::default();
        w.u16(1).u16(0); // version
        w.u32(0x0001_0000); // fontRevision
        w.u32(0); // checksumAdjustment
        w.u32(0x5F0F_3CF5); // magicNumber
        w.u16(0x000B); // flags
        w.u16(self.units_per_em);
        w.u64(0).u64(0); // created, modified
        w.i16(x_min).i16(y_min).i16(x_max).i16(y_max);
        w.u16(0); // macStyle
        w.u16(8); // lowestRecPPEM
        w.i16(2); // fontDirectionHint
        w.i16(1); // indexToLocFormat: long offsets
        w.i16(0); // glyphDataFormat
        w.0
    }

    fn hhea(&self) -> Vec<u8> {
        let (x_min, _, x_max, _) = self.bbox();
        let advance_max = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let mut w = Writer::default();
        w.u16(1).u16(0);
        w.i16(self.ascent).i16(-self.descent).i16(self.line_gap);
        w.u16(advance_max);
        w.i16(x_min.min(0)); // minLeftSideBearing
        w.i16(0); // minRightSideBearing
        w.i16(x_max); // xMaxExtent
        w.i16(1).i16(0).i16(0); // caret slope rise, run, offset
        w.i16(0).i16(0).i16(0).i16(0); // reserved
        w.i16(0); // metricDataFormat
        w.u16(self.glyphs.len() as u16);
        w.0
    }

    fn maxp(&self) -> Vec<u8> {
        let max_points = self
            .glyphs
            .iter()
            .map(|g| g.contours.iter().map(Vec::len).sum::<usize>())
            .max()
            .unwrap_or(0);
        let max_contours = self
            .glyphs
            .iter()
            .map(|g| g.contours.len())
            .max()
            .unwrap_or(0);
        let mut w = Writer::default();
        w.u32(0x0001_0000);
        w.u16(self.glyphs.len() as u16);
        w.u16(max_points as u16).u16(max_contours as u16);
        w.u16(0).u16(0); // composite points, contours
        w.u16(2); // maxZones
        for _ in 0..7 {
            w.u16(0); // twilight, storage, fdefs, idefs, stack, instructions, components
        }
        w.u16(0); // maxComponentDepth
        w.0
    }

    fn maxp_cff(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.u32(0x0000_5000);
        w.u16(self.glyphs.len() as u16);
        w.0
    }

    fn os2(&self, (ascent, descent, line_gap): (i16, i16, i16)) -> Vec<u8> {
        let mut w = Writer::default();
        w.u16(4); // version
        w.i16(500); // xAvgCharWidth
        w.u16(400).u16(5); // weight, width class
        w.u16(0); // fsType
        for _ in 0..10 {
            w.i16(0); // sub/superscript and strikeout metrics
        }
        w.i16(0); // sFamilyClass
        w.bytes(&[0; 10]); // panose
        w.u32(0).u32(0).u32(0).u32(0); // ulUnicodeRange1-4
        w.bytes(b"GLNT");
        w.u16(0x0040); // fsSelection: regular
        w.u16(0x20).u16(0x5A); // first, last char index
        w.i16(ascent).i16(descent).i16(line_gap);
        w.u16(ascent.max(0) as u16).u16(descent.unsigned_abs()); // usWin
        w.u32(1).u32(0); // code page ranges
        w.i16(500).i16(700); // x height, cap height
        w.u16(0).u16(0x20).u16(1); // default char, break char, max context
        w.0
    }

    fn cff(&self) -> Vec<u8> {
        // Every DICT operand is a 5-byte integer, so the top DICT has a fixed
        // size and the offsets it holds can be computed up front
        const TOP_DICT_LEN: usize = 17;
        const HEADER: [u8; 4] = [1, 0, 4, 4];

        let name = cff_index(&[b"GlintTest".to_vec()]);
        let top_len = cff_index(&[vec![0; TOP_DICT_LEN]]).len();
        let strings = cff_index(&[]);
        let global_subrs = cff_index(&[]);
        let charstrings: Vec<Vec<u8>> = self.glyphs.iter().map(|g| charstring(&g.contours)).collect();
        let charstrings = cff_index(&charstrings);
        // defaultWidthX 0
        let private = vec![139, 20];

        let charstrings_at = HEADER.len() + name.len() + top_len + strings.len() + global_subrs.len();
        let private_at = charstrings_at + charstrings.len();

        let mut top = Writer::default();
        top.u8(29).u32(charstrings_at as u32).u8(17);
        top.u8(29).u32(private.len() as u32);
        top.u8(29).u32(private_at as u32).u8(18);
        debug_assert_eq!(top.0.len(), TOP_DICT_LEN);

        let mut w = Writer::default();
        w.bytes(&HEADER)
            .bytes(&name)
            .bytes(&cff_index(&[top.0]))
            .bytes(&strings)
            .bytes(&global_subrs)
            .bytes(&charstrings)
            .bytes(&private);
        w.0
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut w = Writer::default();
        for g in &self.glyphs {
            let lsb = g.contours.iter().flatten().map(|p| p.0).min().unwrap_or(0);
            w.u16(g.advance).i16(lsb);
        }
        w.0
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Writer::default();
        let mut loca = Writer::default();
        for g in &self.glyphs {
            loca.u32(glyf.0.len() as u32);
            if g.contours.is_empty() {
                continue;
            }
            let all: Vec<ContourPoint> = g.contours.iter().flatten().copied().collect();
            let x_min = all.iter().map(|p| p.0).min().unwrap_or(0);
            let y_min = all.iter().map(|p| p.1).min().unwrap_or(0);
            let x_max = all.iter().map(|p| p.0).max().unwrap_or(0);
            let y_max = all.iter().map(|p| p.1).max().unwrap_or(0);

            glyf.i16(g.contours.len() as i16);
            glyf.i16(x_min).i16(y_min).i16(x_max).i16(y_max);
            let mut end = 0usize;
            for c in &g.contours {
                end += c.len();
                glyf.u16((end - 1) as u16);
            }
            glyf.u16(0); // instructionLength
            for p in &all {
                // Long signed deltas only, no repeats
                glyf.u8(u8::from(p.2));
            }
            let mut prev = 0i16;
            for p in &all {
                glyf.i16(p.0 - prev);
                prev = p.0;
            }
            prev = 0;
            for p in &all {
                glyf.i16(p.1 - prev);
                prev = p.1;
            }
            glyf.pad4();
        }
        loca.u32(glyf.0.len() as u32);
        (glyf.0, loca.0)
    }

    fn cmap(&self) -> Vec<u8> {
        let mut mapped: Vec<(u32, u16)> = self
            .glyphs
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.ch.map(|ch| (u32::from(ch), i as u16)))
            .collect();
        mapped.sort_unstable();

        let mut w = Writer::default();
        w.u16(0).u16(2); // version, numTables
        // Unicode full repertoire and Windows UCS-4 share one subtable
        w.u16(0).u16(4).u32(20);
        w.u16(3).u16(10).u32(20);
        w.u16(12).u16(0);
        w.u32(16 + 12 * mapped.len() as u32);
        w.u32(0); // language
        w.u32(mapped.len() as u32);
        for (cp, gid) in mapped {
            w.u32(cp).u32(cp).u32(u32::from(gid));
        }
        w.0
    }

    fn kern_table(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.u16(0).u16(self.kern_subtables.len() as u16); // version 0
        for (coverage, kerning) in &self.kern_subtables {
            let mut pairs: Vec<(u16, u16, i16)> = kerning
                .iter()
                .filter_map(|&(l, r, v)| Some((self.glyph_index(l)?, self.glyph_index(r)?, v)))
                .collect();
            pairs.sort_unstable_by_key(|&(l, r, _)| (l, r));

            let n = pairs.len() as u16;
            w.u16(0); // subtable version
            w.u16(14 + 6 * n); // length
            w.u16(*coverage);
            let (search_range, entry_selector) = search_params(n, 6);
            w.u16(n)
                .u16(search_range)
                .u16(entry_selector)
                .u16((6 * n).saturating_sub(search_range));
            for (l, r, v) in pairs {
                w.u16(l).u16(r).i16(v);
            }
        }
        w.0
    }
}

fn search_params(count: u16, unit: u16) -> (u16, u16) {
    let mut pow = 1u16;
    let mut log = 0u16;
    while pow.saturating_mul(2) <= count {
        pow *= 2;
        log += 1;
    }
    (pow.saturating_mul(unit), log)
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |acc, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        acc.wrapping_add(u32::from_be_bytes(word))
    })
}

/// A CFF INDEX with 4-byte offsets
fn cff_index(items: &[Vec<u8>]) -> Vec<u8> {
    let mut w = Writer::default();
    w.u16(items.len() as u16);
    if items.is_empty() {
        return w.0;
    }
    w.u8(4);
    let mut offset = 1u32;
    w.u32(offset);
    for item in items {
        offset += item.len() as u32;
        w.u32(offset);
    }
    for item in items {
        w.bytes(item);
    }
    w.0
}

/// Type 2 charstring for TrueType-style contours
///
/// Off-curve points are quadratic controls; each quadratic is raised to a
/// cubic with integer controls. Two off-curve points in a row imply an
/// on-curve midpoint.
fn charstring(contours: &[Vec<ContourPoint>]) -> Vec<u8> {
    let mut w = Writer::default();
    let mut pen = (0i32, 0i32);

    for contour in contours {
        let Some(start) = contour.iter().position(|p| p.2) else {
            continue;
        };
        let n = contour.len();
        let at = |i: usize| {
            let p = contour[(start + i) % n];
            ((i32::from(p.0), i32::from(p.1)), p.2)
        };

        let (first, _) = at(0);
        cs_number(&mut w, first.0 - pen.0);
        cs_number(&mut w, first.1 - pen.1);
        w.u8(21); // rmoveto
        pen = first;

        let mut i = 1;
        while i <= n {
            let (p, on) = at(i);
            if on {
                cs_number(&mut w, p.0 - pen.0);
                cs_number(&mut w, p.1 - pen.1);
                w.u8(5); // rlineto
                pen = p;
                i += 1;
                continue;
            }
            let (next, next_on) = at(i + 1);
            let end = if next_on {
                next
            } else {
                ((p.0 + next.0) / 2, (p.1 + next.1) / 2)
            };
            let c1 = (pen.0 + (p.0 - pen.0) * 2 / 3, pen.1 + (p.1 - pen.1) * 2 / 3);
            let c2 = (end.0 + (p.0 - end.0) * 2 / 3, end.1 + (p.1 - end.1) * 2 / 3);
            for (x, y) in [c1, c2, end] {
                cs_number(&mut w, x - pen.0);
                cs_number(&mut w, y - pen.1);
                pen = (x, y);
            }
            w.u8(8); // rrcurveto
            i += if next_on { 2 } else { 1 };
        }
    }
    w.u8(14); // endchar
    w.0
}

fn cs_number(w: &mut Writer, v: i32) {
    match v {
        -107..=107 => {
            w.u8((v + 139) as u8);
        }
        108..=1131 => {
            let v = v - 108;
            w.u8((v / 256 + 247) as u8).u8((v % 256) as u8);
        }
        -1131..=-108 => {
            let v = -v - 108;
            w.u8((v / 256 + 251) as u8).u8((v % 256) as u8);
        }
        _ => {
            w.u8(28).i16(v as i16);
        }
    }
}

fn assemble(sfnt_version: u32, mut tables: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    // Table records must be sorted for binary search
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    let n = tables.len() as u16;
    let (search_range, entry_selector) = search_params(n, 16);
    let mut w = Writer::default();
    w.u32(sfnt_version);
    w.u16(n)
        .u16(search_range)
        .u16(entry_selector)
        .u16((16 * n).saturating_sub(search_range));

    let mut offset = 12 + 16 * tables.len();
    for (tag, data) in &tables {
        w.bytes(tag);
        w.u32(checksum(data)).u32(offset as u32).u32(data.len() as u32);
        offset += (data.len() + 3) & !3;
    }
    for (_, data) in &tables {
        w.bytes(data);
        w.pad4();
    }
    w.0
}

#[derive(Default)]
struct Writer(Vec<u8>);

impl Writer {
    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }

    fn u16(&mut self, v: u16) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn i16(&mut self, v: i16) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.0.extend_from_slice(v);
        self
    }

    fn pad4(&mut self) {
        while self.0.len() % 4 != 0 {
            self.0.push(0);
        }
    }
}

/// Advance of `A` and `V` in [`test_font`]
pub const WIDE_ADVANCE: u16 = 700;

/// Kerning between `A` and `V` in [`test_font`]
pub const AV_KERN: i16 = -80;

/// The stock test font
pub fn test_font_builder() -> FontBuilder {
    FontBuilder::new(1000, 800, 200, 0)
        .glyph(
            'A',
            WIDE_ADVANCE,
            vec![
                vec![(20, 0, true), (350, 700, true), (680, 0, true)],
                // Counter runs the other way
                vec![(250, 150, true), (450, 150, true), (350, 400, true)],
            ],
        )
        .glyph(
            'V',
            WIDE_ADVANCE,
            vec![vec![(20, 700, true), (680, 700, true), (350, 0, true)]],
        )
        .glyph(
            'I',
            300,
            vec![vec![
                (100, 0, true),
                (100, 700, true),
                (200, 700, true),
                (200, 0, true),
            ]],
        )
        .glyph(
            'O',
            WIDE_ADVANCE,
            vec![
                vec![
                    (50, 350, true),
                    (50, 700, false),
                    (350, 700, true),
                    (650, 700, false),
                    (650, 350, true),
                    (650, 0, false),
                    (350, 0, true),
                    (50, 0, false),
                ],
                vec![
                    (200, 350, true),
                    (200, 100, false),
                    (350, 100, true),
                    (500, 100, false),
                    (500, 350, true),
                    (500, 600, false),
                    (350, 600, true),
                    (200, 600, false),
                ],
            ],
        )
        .glyph(' ', 250, Vec::new())
        .kern('A', 'V', AV_KERN)
}

/// Bytes of the stock test font
pub fn test_font() -> Vec<u8> {
    test_font_builder().build()
}

/// The stock test font's glyphs as an OpenType CFF face
pub fn test_cff_font() -> Vec<u8> {
    test_font_builder().build_cff()
}

/// Writes the stock test font into `dir` and returns its path
pub fn write_test_font(dir: &Path) -> std::io::Result<PathBuf> {
    let path = dir.join("glint-test.ttf");
    std::fs::write(&path, test_font())?;
    Ok(path)
}

/// Wraps a single font into a one-face TrueType collection
pub fn collection_of(font: &[u8]) -> Vec<u8> {
    // Header is 16 bytes; inner table offsets are relative to the file
    const HEADER: u32 = 16;
    let mut w = Writer::default();
    w.bytes(b"ttcf");
    w.u16(1).u16(0);
    w.u32(1);
    w.u32(HEADER);

    let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
    let mut shifted = font.to_vec();
    for i in 0..num_tables {
        let at = 12 + i * 16 + 8;
        let old = u32::from_be_bytes([shifted[at], shifted[at + 1], shifted[at + 2], shifted[at + 3]]);
        shifted[at..at + 4].copy_from_slice(&(old + HEADER).to_be_bytes());
    }
    w.bytes(&shifted);
    w.0
}
