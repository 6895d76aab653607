use crate::commands::{open_pool, prepare, CommandResult, StepFailure};
use catalog_db::{migrations, CatalogSeedDataset, SeedCheck, SeedResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = CatalogSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = CatalogSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedResult, StepFailure> = if verification.all_present {
            Ok(seeded)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "demo catalog loaded: {} products, {} comments",
                seeded.products_seeded, seeded.comments_seeded
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_failure_message(checks: &[SeedCheck]) -> String {
    let failed = checks
        .iter()
        .filter(|check| !check.present)
        .map(|check| format!("product {} ({})", check.product_id, check.name))
        .collect::<Vec<_>>();

    if failed.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for: {}", failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use catalog_db::SeedCheck;

    use super::verification_failure_message;

    #[test]
    fn verification_error_message_targets_failed_products() {
        let checks = [
            SeedCheck { product_id: 1, name: "Desk lamp", present: true },
            SeedCheck { product_id: 2, name: "Armchair", present: false },
            SeedCheck { product_id: 3, name: "Bookshelf", present: false },
        ];

        assert_eq!(
            verification_failure_message(&checks),
            "Seed verification failed for: product 2 (Armchair), product 3 (Bookshelf)"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_all_present() {
        let checks = [SeedCheck { product_id: 1, name: "Desk lamp", present: true }];

        assert_eq!(verification_failure_message(&checks), "Some seed data failed to load");
    }
}
