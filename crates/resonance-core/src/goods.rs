//! Goods catalog and item-list matching

use resonance_kernel::vision::TextBox;
use resonance_kernel::{GestureBatch, Site};

/// Goods sold at each site's exchange
#[must_use]
pub const fn goods_for(site: Site) -> &'static [&'static str] {
    match site {
        Site::Shoggolith => &[
            "发动机",
            "弹丸加速装置",
            "家电",
            "汽配零件",
            "红茶",
            "高档餐具",
            "沃德烤鸡",
            "罐头",
            "沃德山泉",
            "修格里严选礼包",
        ],
        Site::Brcl => &[
            "弹丸加速装置",
            "防弹背心",
            "炮弹",
            "精钢",
            "塑胶炸药",
            "子弹",
            "汽油",
            "靛红五月军用食品",
        ],
        Site::Mander => &[
            "图形加速卡",
            "钛矿石",
            "铁轨用特种钢材",
            "曼德工具箱",
            "黄铜",
            "钢筋混凝土轨枕",
            "建材",
            "铁矿石",
            "石材",
            "砂石",
        ],
        Site::Wilderness => &["琥珀", "孔雀石", "绿松石", "棉花", "铅矿石", "石墨", "土豆"],
        Site::Onederland => &[
            "铁矿石",
            "沙金",
            "青金石",
            "玛瑙",
            "漆黑矿渣",
            "石英砂",
            "纯金线材",
            "金箔",
        ],
        Site::Clarity => &[
            "游戏机",
            "银矿石",
            "扬声器",
            "游戏卡带",
            "录像带",
            "荧光棒",
            "火车玩具",
            "录音带",
        ],
        Site::Freeport => &[
            "桦石发财树",
            "石墨烯",
            "人工晶花",
            "电子配件",
            "航天纪念品",
            "斑节虾",
            "坚果",
            "啤酒",
            "海盐",
            "年货大礼包",
        ],
        Site::AnitaWeapon => &[
            "火澄石",
            "负片炮弹",
            "阿妮塔202军用无人机",
            "抗污染防护服",
            "钛合金",
            "碳纤维",
            "形态共振瞄准器",
            "高导磁硅钢片",
            "黄铜线圈",
        ],
        Site::AnitaEnergy => &[
            "阿妮塔小型桦树发电机",
            "石墨烯电池",
            "阿妮塔101民用无人机",
            "家用太阳能电池组",
            "锂电池",
            "充电电池",
        ],
        Site::AnitaRocket => &[
            "航天半导体",
            "太阳电池阵",
            "蜂窝防热烧蚀材料",
            "高导热陶瓷",
            "镍基高温合金",
            "液氧甲烷燃料",
            "无刷电机",
            "火箭拼装玩具",
        ],
    }
}

/// Every known good once, in catalog order
#[must_use]
pub fn all_goods() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = Vec::new();
    for site in Site::ALL {
        for &name in goods_for(site) {
            if !all.contains(&name) {
                all.push(name);
            }
        }
    }
    all
}

/// Whether a site's exchange sells a good
#[must_use]
pub fn sells(site: Site, name: &str) -> bool {
    goods_for(site).contains(&name)
}

/// Tap every wanted good visible on the item list
///
/// Returns the taps and the goods still wanted afterwards. Each wanted
/// name is tapped at most once even if it appears in several boxes.
#[must_use]
pub fn match_goods(wanted: &[String], boxes: &[TextBox]) -> (GestureBatch, Vec<String>) {
    let mut remaining = wanted.to_vec();
    let mut taps = GestureBatch::new();
    for b in boxes {
        if let Some(i) = remaining.iter().position(|name| *name == b.text) {
            remaining.remove(i);
            taps = taps.tap(b.position);
        }
    }
    (taps, remaining)
}
