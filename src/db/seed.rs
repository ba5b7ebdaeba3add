use rusqlite::{params, Connection};

use crate::db::models::SectionKey;
use crate::db::utc_timestamp;
use crate::state::DbPool;

/// Credentials for the first admin account, already hashed.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub password_hash: String,
}

impl SeedAdmin {
    pub fn new(username: &str, password: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            username: username.trim().to_string(),
            password_hash: bcrypt::hash(password, cost)?,
        })
    }
}

struct SectionSeed {
    title: &'static str,
    subtitle: &'static str,
    body: &'static str,
    highlight: &'static str,
    image: &'static str,
    extra_info: &'static str,
}

fn section_seed(key: SectionKey) -> SectionSeed {
    match key {
        SectionKey::Top => SectionSeed {
            title: "Sample Cafe へようこそ",
            subtitle: "一杯ごとに、ちいさなひと休みを。",
            body: "こちらはカフェ・飲食店向けのデモサイトです。写真や文章、色合いを整えることで、\
                   初めてのお客様にもお店の雰囲気やこだわりが伝わるトップページを表現できます。\
                   管理画面からテキストや画像を自由に編集して、あなたのお店仕様にカスタマイズしてください。",
            highlight: "淹れたての時間を、ゆっくりと。",
            image: "/static/images/hero.svg",
            extra_info: "signature=季節ごとに変わるシングルオリジンコーヒーと自家製デザート",
        },
        SectionKey::Access => SectionSeed {
            title: "アクセス・営業時間",
            subtitle: "落ち着いた時間を過ごせる、あなたの隠れ家へ。",
            body: "こちらのページでは、住所・電話番号・最寄り駅からの道順など、\
                   ご来店に必要な情報をまとめて案内できます。管理画面から営業時間や\
                   定休日などを変更して、実際の店舗情報に合わせてご利用ください。",
            highlight: "平日 09:00〜20:00 / 土日祝 10:00〜22:00",
            image: "/static/images/interior.svg",
            extra_info: "住所=デモ市サンプル区サンプル町1-2-3\n電話=000-0000-0000\n定休日=年中無休",
        },
        SectionKey::Reservations => SectionSeed {
            title: "ご予約について",
            subtitle: "お席のご予約はお気軽にどうぞ。",
            body: "お客様がスムーズにお席を予約できるように、予約方法をわかりやすくまとめておくスペースです。\
                   外部の予約システムへのリンクや、お電話・メールでの受付方法などを自由に記載できます。",
            highlight: "一人ひとりに合わせた心地よい時間をご用意します。",
            image: "/static/images/latte-art.svg",
            extra_info: "cta=Webで予約する|link=#",
        },
        SectionKey::About => SectionSeed {
            title: "ストーリーとこだわり",
            subtitle: "一杯のコーヒーに込めた想い。",
            body: "お店のはじまりや、豆・食材へのこだわり、空間づくりへの想いなどを伝えるためのページです。\
                   産地とのつながりや、地域への想い、スタッフのストーリーなどを自由に書き換えて、\
                   ブランドの世界観をお客様に届けてください。",
            highlight: "心をほどく一杯を、ていねいに。",
            image: "/static/images/roastery.svg",
            extra_info: "team=オーナー, バリスタ, パティシエ",
        },
        SectionKey::Features => SectionSeed {
            title: "ハイライト",
            subtitle: "訪れるたびにうれしい、小さな特別をご用意しています。",
            body: "おすすめメニューや季節限定、イベント情報など、お店の『推しポイント』を\
                   カード形式で一覧表示できます。管理画面から自由に追加・削除・編集可能です。",
            highlight: "今日の気分に寄り添う一杯を。",
            image: "/static/images/dessert.svg",
            extra_info: "",
        },
    }
}

const GALLERY_SEED: &[(&str, &str)] = &[
    ("/static/images/gallery1.svg", "看板エスプレッソの一杯"),
    ("/static/images/gallery2.svg", "イベントやポップアップの様子"),
    ("/static/images/gallery3.svg", "季節のデザートとドリンクのペアリング"),
];

const FEATURE_SEED: &[(&str, &str, &str)] = &[
    (
        "季節のペアリング",
        "コーヒーごとに相性を考えた、季節限定のデザートセットをご用意しています。",
        "fa-leaf",
    ),
    (
        "アコースティックナイト",
        "週末の夜には、地域のアーティストによる生演奏をお楽しみいただけます。",
        "fa-music",
    ),
    (
        "バリスタワークショップ",
        "ご自宅でも楽しめるハンドドリップ講座など、少人数制のワークショップを開催しています。",
        "fa-chalkboard-teacher",
    ),
];

const ANNOUNCEMENT_SEED: (&str, &str) = (
    "本日のおすすめ豆が変わりました",
    "季節のおすすめや新入荷の豆など、最新情報をここでお知らせできます。",
);

fn table_is_empty(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count == 0)
}

/// Fill empty tables with default rows. Tables that already hold data are left alone.
pub fn seed_defaults(pool: &DbPool, admin: Option<&SeedAdmin>) -> anyhow::Result<()> {
    let conn = pool.get()?;

    if table_is_empty(&conn, "users")? {
        match admin {
            Some(admin) => {
                conn.execute(
                    "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
                    params![admin.username, admin.password_hash, utc_timestamp()],
                )?;
                tracing::info!("Created initial admin user '{}'", admin.username);
            }
            None => {
                tracing::warn!("No admin account exists; finish setup at /admin/setup");
            }
        }
    }

    for key in SectionKey::ALL {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM site_content WHERE section = ?1",
            params![key.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            continue;
        }
        let seed = section_seed(key);
        conn.execute(
            "INSERT INTO site_content (section, title, subtitle, body, highlight, image, extra_info)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                key.as_str(),
                seed.title,
                seed.subtitle,
                seed.body,
                seed.highlight,
                seed.image,
                seed.extra_info,
            ],
        )?;
        tracing::debug!("Seeded content section {}", key);
    }

    if table_is_empty(&conn, "gallery_images")? {
        for (order, (path, caption)) in GALLERY_SEED.iter().enumerate() {
            conn.execute(
                "INSERT INTO gallery_images (file_path, caption, display_order, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![path, caption, order as i64 + 1, utc_timestamp()],
            )?;
        }
    }

    if table_is_empty(&conn, "features")? {
        for (title, description, icon) in FEATURE_SEED {
            conn.execute(
                "INSERT INTO features (title, description, icon) VALUES (?1, ?2, ?3)",
                params![title, description, icon],
            )?;
        }
    }

    if table_is_empty(&conn, "announcements")? {
        let (title, content) = ANNOUNCEMENT_SEED;
        conn.execute(
            "INSERT INTO announcements (title, content, published_at) VALUES (?1, ?2, ?3)",
            params![title, content, utc_timestamp()],
        )?;
    }

    Ok(())
}
