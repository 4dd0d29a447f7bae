use std::{fs, io::Write, sync::Arc};

use anyhow::Result;
use fzu_ics_core::{
    auth::Authenticator,
    ics::CalendarSynthesizer,
    portal::jwch::JwchPortal,
    session::SessionStore,
    types::{Credentials, IcsOptions},
};

fn authenticator() -> Authenticator<JwchPortal> {
    Authenticator::new(JwchPortal::new(), Arc::new(SessionStore::new()))
}

/// 获取讲座日历命令
pub async fn fetch_command(uid: String, password: String, output: Option<String>) -> Result<()> {
    tracing::info!("获取讲座日历: 用户={}", uid);

    let credentials = Credentials {
        user_id: uid.clone(),
        password,
    };

    println!("验证用户凭据...");
    let handle = authenticator().login(&credentials).await?;
    println!("✓ 凭据验证成功");

    let options = IcsOptions {
        calendar_name: Some(format!("福州大学讲座 [{}]", uid)),
        ..Default::default()
    };
    let synthesizer = CalendarSynthesizer::new(options);

    println!("生成ICS日历文件...");
    let calendar = synthesizer.synthesize_for(&handle).await?;

    match output {
        Some(path) => {
            fs::write(&path, calendar)?;
            println!("✓ ICS文件已保存到: {}", path);
        }
        None => {
            std::io::stdout().write_all(&calendar)?;
        }
    }

    Ok(())
}

/// 验证凭据命令
pub async fn validate_command(uid: String, password: String) -> Result<()> {
    tracing::info!("验证凭据: 用户={}", uid);

    let credentials = Credentials {
        user_id: uid,
        password,
    };

    println!("验证用户凭据...");
    authenticator().login(&credentials).await?;
    println!("凭据验证成功");

    Ok(())
}
