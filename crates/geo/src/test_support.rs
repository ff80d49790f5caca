//! Hand-built EXIF containers for tests.

pub const ASCII: u16 = 2;
pub const SHORT: u16 = 3;
pub const LONG: u16 = 4;
pub const RATIONAL: u16 = 5;

pub const GPS_LATITUDE_REF: u16 = 0x0001;
pub const GPS_LATITUDE: u16 = 0x0002;
pub const GPS_LONGITUDE_REF: u16 = 0x0003;
pub const GPS_LONGITUDE: u16 = 0x0004;
pub const ORIENTATION: u16 = 0x0112;
pub const GPS_IFD_POINTER: u16 = 0x8825;

pub struct Entry {
    pub tag: u16,
    pub kind: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

pub fn ascii(tag: u16, s: &str) -> Entry {
    let mut data = s.as_bytes().to_vec();
    data.push(0);
    Entry { tag, kind: ASCII, count: data.len() as u32, data }
}

pub fn dms(tag: u16, parts: [(u32, u32); 3]) -> Entry {
    let data = parts
        .iter()
        .flat_map(|(n, d)| n.to_be_bytes().into_iter().chain(d.to_be_bytes()))
        .collect();
    Entry { tag, kind: RATIONAL, count: 3, data }
}

pub fn write_ifd(out: &mut Vec<u8>, entries: &[Entry], data_offset: u32, data: &mut Vec<u8>) {
    out.extend((entries.len() as u16).to_be_bytes());
    for e in entries {
        out.extend(e.tag.to_be_bytes());
        out.extend(e.kind.to_be_bytes());
        out.extend(e.count.to_be_bytes());
        if e.data.len() <= 4 {
            let mut inline = e.data.clone();
            inline.resize(4, 0);
            out.extend(inline);
        } else {
            out.extend((data_offset + data.len() as u32).to_be_bytes());
            data.extend(&e.data);
        }
    }
    out.extend(0u32.to_be_bytes()); // no next IFD
}

/// Big-endian TIFF stream with an IFD0 and, optionally, a GPS IFD.
pub fn tiff(mut ifd0: Vec<Entry>, gps: Option<Vec<Entry>>) -> Vec<u8> {
    let ifd0_len = 2 + 12 * (ifd0.len() + gps.is_some() as usize) + 4;
    let gps_offset = 8 + ifd0_len as u32;

    if gps.is_some() {
        ifd0.push(Entry {
            tag: GPS_IFD_POINTER,
            kind: LONG,
            count: 1,
            data: gps_offset.to_be_bytes().to_vec(),
        });
    }

    let mut out = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
    let mut unused = Vec::new();
    write_ifd(&mut out, &ifd0, 0, &mut unused);

    if let Some(gps) = gps {
        let data_offset = gps_offset + (2 + 12 * gps.len() + 4) as u32;
        let mut data = Vec::new();
        write_ifd(&mut out, &gps, data_offset, &mut data);
        out.extend(data);
    }

    out
}

/// Minimal JPEG: SOI, APP1 carrying the EXIF TIFF stream, EOI.
pub fn jpeg(tiff: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend(((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend(b"Exif\x00\x00");
    out.extend(tiff);
    out.extend([0xFF, 0xD9]);
    out
}

pub fn orientation() -> Entry {
    Entry { tag: ORIENTATION, kind: SHORT, count: 1, data: 1u16.to_be_bytes().to_vec() }
}

// 19°4'33.6" N, 72°52'39.72" E
pub fn mumbai_gps(lat_ref: &str, lng_ref: &str) -> Vec<Entry> {
    vec![
        ascii(GPS_LATITUDE_REF, lat_ref),
        dms(GPS_LATITUDE, [(19, 1), (4, 1), (336, 10)]),
        ascii(GPS_LONGITUDE_REF, lng_ref),
        dms(GPS_LONGITUDE, [(72, 1), (52, 1), (3972, 100)]),
    ]
}
