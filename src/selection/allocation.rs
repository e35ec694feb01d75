//! @acp:module "Bucket Allocation"
//! @acp:summary "Ratio-based quotas with a fixed fallback cascade"
//! @acp:domain selection
//! @acp:layer service

use super::config::BucketRatios;
use super::types::{Bucket, BucketCounts};

/// One backfill step of the fallback cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backfill {
    /// Bucket that ran short
    pub to: Bucket,
    /// Bucket that donated
    pub from: Bucket,
    pub amount: usize,
}

/// Allocation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Quotas from ratios alone, summing to the requested total
    pub ideal: BucketCounts,
    /// Final per-bucket quotas
    pub quotas: BucketCounts,
    /// Backfills applied, in cascade order
    pub backfills: Vec<Backfill>,
}

#[cfg(test)]
impl AllocationPlan {
    pub fn total(&self) -> usize {
        self.quotas.total()
    }
}

/// Allocate `total` questions across buckets of the given sizes
///
/// Step 1: ideal quotas from ratios, rounding drift settled by largest remainder
/// Step 2: cap each bucket at its pool size
/// Step 3: backfill each shortfall from the bucket's donors in fallback order
///
/// The quotas sum to `min(total, available.total())`.
pub fn allocate(total: usize, available: BucketCounts, ratios: &BucketRatios) -> AllocationPlan {
    let ideal = ideal_quotas(total, ratios);

    let mut quotas = BucketCounts::default();
    let mut shortfalls = BucketCounts::default();
    for bucket in Bucket::ALL {
        let want = ideal.get(bucket);
        let have = available.get(bucket);
        *quotas.get_mut(bucket) = want.min(have);
        *shortfalls.get_mut(bucket) = want.saturating_sub(have);
    }

    let mut backfills = Vec::new();
    for bucket in Bucket::ALL {
        let mut missing = shortfalls.get(bucket);
        for donor in bucket.fallback_order() {
            if missing == 0 {
                break;
            }
            let spare = available.get(donor) - quotas.get(donor);
            let amount = missing.min(spare);
            if amount == 0 {
                continue;
            }
            *quotas.get_mut(donor) += amount;
            missing -= amount;
            backfills.push(Backfill {
                to: bucket,
                from: donor,
                amount,
            });
        }
    }

    AllocationPlan {
        ideal,
        quotas,
        backfills,
    }
}

/// Ratio quotas that sum exactly to `total`
fn ideal_quotas(total: usize, ratios: &BucketRatios) -> BucketCounts {
    let ratio_sum = Bucket::ALL.iter().map(|&b| u128::from(ratios.get(b))).sum::<u128>();
    if ratio_sum == 0 {
        return BucketCounts::new(total, 0, 0);
    }

    // Widened so any usize total times a ratio fits
    let mut quotas = BucketCounts::default();
    let mut remainders: Vec<(Bucket, u128)> = Vec::with_capacity(Bucket::ALL.len());
    for bucket in Bucket::ALL {
        let scaled = total as u128 * u128::from(ratios.get(bucket));
        *quotas.get_mut(bucket) = (scaled / ratio_sum) as usize;
        remainders.push((bucket, scaled % ratio_sum));
    }

    // Stable sort keeps bucket order among equal remainders
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    let drift = total - quotas.total();
    for (bucket, _) in remainders.into_iter().take(drift) {
        *quotas.get_mut(bucket) += 1;
    }

    quotas
}
