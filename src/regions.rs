//! Static administrative region table (법정동 시군구 코드).
//!
//! Read-only lookup between 5-digit region codes and display names.

pub struct Sido {
    pub code: &'static str,
    pub name: &'static str,
    /// Prefix used in display names outside Seoul ("부산 해운대구").
    pub short_name: &'static str,
    /// (region code, district name)
    pub regions: &'static [(&'static str, &'static str)],
}

pub const SEOUL: &str = "11";

pub const SIDO_LIST: &[Sido] = &[
    Sido {
        code: "11",
        name: "서울특별시",
        short_name: "서울",
        regions: &[
            ("11110", "종로구"),
            ("11140", "중구"),
            ("11170", "용산구"),
            ("11200", "성동구"),
            ("11215", "광진구"),
            ("11230", "동대문구"),
            ("11260", "중랑구"),
            ("11290", "성북구"),
            ("11305", "강북구"),
            ("11320", "도봉구"),
            ("11350", "노원구"),
            ("11380", "은평구"),
            ("11410", "서대문구"),
            ("11440", "마포구"),
            ("11470", "양천구"),
            ("11500", "강서구"),
            ("11530", "구로구"),
            ("11545", "금천구"),
            ("11560", "영등포구"),
            ("11590", "동작구"),
            ("11620", "관악구"),
            ("11650", "서초구"),
            ("11680", "강남구"),
            ("11710", "송파구"),
            ("11740", "강동구"),
        ],
    },
    Sido {
        code: "26",
        name: "부산광역시",
        short_name: "부산",
        regions: &[
            ("26110", "중구"),
            ("26140", "서구"),
            ("26170", "동구"),
            ("26200", "영도구"),
            ("26230", "부산진구"),
            ("26260", "동래구"),
            ("26290", "남구"),
            ("26320", "북구"),
            ("26350", "해운대구"),
            ("26380", "사하구"),
            ("26410", "금정구"),
            ("26440", "강서구"),
            ("26470", "연제구"),
            ("26500", "수영구"),
            ("26530", "사상구"),
            ("26710", "기장군"),
        ],
    },
    Sido {
        code: "27",
        name: "대구광역시",
        short_name: "대구",
        regions: &[
            ("27110", "중구"),
            ("27140", "동구"),
            ("27170", "서구"),
            ("27200", "남구"),
            ("27230", "북구"),
            ("27260", "수성구"),
            ("27290", "달서구"),
            ("27710", "달성군"),
        ],
    },
    Sido {
        code: "28",
        name: "인천광역시",
        short_name: "인천",
        regions: &[
            ("28110", "중구"),
            ("28140", "동구"),
            ("28177", "미추홀구"),
            ("28185", "연수구"),
            ("28200", "남동구"),
            ("28237", "부평구"),
            ("28245", "계양구"),
            ("28260", "서구"),
        ],
    },
    Sido {
        code: "41",
        name: "경기도",
        short_name: "경기",
        regions: &[
            ("41117", "수원시 영통구"),
            ("41135", "성남시 분당구"),
            ("41173", "안양시 동안구"),
            ("41210", "광명시"),
            ("41285", "고양시 일산동구"),
            ("41450", "하남시"),
            ("41461", "용인시 처인구"),
            ("41463", "용인시 기흥구"),
            ("41465", "용인시 수지구"),
            ("41570", "김포시"),
            ("41590", "화성시"),
        ],
    },
];

/// Default series for the trend comparison.
pub const POPULAR_REGIONS: &[&str] = &[
    "11680", "11650", "11710", "11440", "11170", "11200", "41135", "11740",
];

/// One entry of the flattened table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub sido: &'static str,
    pub name: &'static str,
}

impl Region {
    /// Bare district name in Seoul, "<province> <district>" elsewhere.
    pub fn display_name(&self) -> String {
        match find_sido(self.sido) {
            Some(sido) if sido.code != SEOUL => format!("{} {}", sido.short_name, self.name),
            _ => self.name.to_string(),
        }
    }
}

pub fn find_sido(code: &str) -> Option<&'static Sido> {
    SIDO_LIST.iter().find(|s| s.code == code)
}

pub fn all() -> impl Iterator<Item = Region> {
    SIDO_LIST.iter().flat_map(|sido| {
        sido.regions.iter().map(move |&(code, name)| Region { code, sido: sido.code, name })
    })
}

pub fn lookup(code: &str) -> Option<Region> {
    all().find(|r| r.code == code)
}

/// Resolve a display name ("마포구", "부산 중구", "부산광역시 중구"). A bare
/// district name shared by several provinces is ambiguous and yields None.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let qualified = all().find(|r| {
        find_sido(r.sido).is_some_and(|s| {
            name == format!("{} {}", s.short_name, r.name) || name == format!("{} {}", s.name, r.name)
        })
    });
    if let Some(r) = qualified {
        return Some(r.code);
    }

    let mut bare = all().filter(|r| r.name == name);
    match (bare.next(), bare.next()) {
        (Some(r), None) => Some(r.code),
        _ => None,
    }
}

/// Regions whose code or full name contains `query`.
pub fn search(query: &str, limit: usize) -> Vec<Region> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    all()
        .filter(|r| {
            r.code.contains(query)
                || r.display_name().contains(query)
                || find_sido(r.sido).is_some_and(|s| format!("{} {}", s.name, r.name).contains(query))
        })
        .take(limit)
        .collect()
}
