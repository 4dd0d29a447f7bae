/// 地理坐标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// 场馆坐标表
///
/// 按声明顺序依次尝试子串匹配，第一个命中的条目生效。
/// 更具体的场馆名必须排在它可能包含的短名之前。
const VENUES: &[(&str, GeoPoint)] = &[
    (
        "福州大学图书馆",
        GeoPoint {
            lat: 26.05896002955218,
            lon: 119.19767194009012,
        },
    ),
    (
        "铜盘科报厅A",
        GeoPoint {
            lat: 26.103566850977305,
            lon: 119.26282667315306,
        },
    ),
    (
        "铜盘科报厅B",
        GeoPoint {
            lat: 26.103443904554403,
            lon: 119.26236726136176,
        },
    ),
    (
        "晋江校区A",
        GeoPoint {
            lat: 24.557758583454426,
            lon: 118.585637992599,
        },
    ),
    (
        "晋江校区B",
        GeoPoint {
            lat: 24.557395418615222,
            lon: 118.58492906232163,
        },
    ),
    (
        "阳光科技楼",
        GeoPoint {
            lat: 26.052188999999988,
            lon: 119.20233499999995,
        },
    ),
    (
        "阳光楼",
        GeoPoint {
            lat: 26.052188999999988,
            lon: 119.20233499999995,
        },
    ),
    (
        "大梦书屋",
        GeoPoint {
            lat: 26.05926300000002,
            lon: 119.19733999999994,
        },
    ),
    (
        "嘉锡楼",
        GeoPoint {
            lat: 26.059567,
            lon: 119.19447500000001,
        },
    ),
    (
        "晋江楼",
        GeoPoint {
            lat: 26.061205809110632,
            lon: 119.20112561376197,
        },
    ),
];

/// 场馆坐标解析器
///
/// 讲座地点是自由文本，这里只做已知场馆名的子串匹配，
/// 未命中则不附带地理坐标。
pub struct GeoResolver {
    venues: &'static [(&'static str, GeoPoint)],
}

impl GeoResolver {
    pub fn new() -> Self {
        Self { venues: VENUES }
    }

    /// 解析地点文本对应的坐标
    pub fn resolve(&self, location: &str) -> Option<GeoPoint> {
        self.venues
            .iter()
            .find(|(name, _)| location.contains(name))
            .map(|(_, point)| *point)
    }
}

impl Default for GeoResolver {
    fn default() -> Self {
        Self::new()
    }
}
